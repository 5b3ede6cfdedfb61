//! File encryption/decryption operations
//!
//! Thin file front end over the codec. Files hold raw ciphertext exactly as
//! produced by the AEAD; the nonce is kept by the caller, not in the file.

use crate::error::{ChachaboxError, ErrorCategory, ErrorKind, Result};
use crate::keys::KeyReader;
use crate::variant::Variant;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Encrypt a file
///
/// Reads plaintext from `input_path`, encrypts it under the key from
/// `key_reader` and `nonce`, and writes the ciphertext to `output_path`.
///
/// The output is written atomically with mode 0o600 on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    nonce: &[u8],
    variant: Variant,
    key_reader: &mut dyn KeyReader,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let key = key_reader.read_key()?;
    let ciphertext = variant
        .encrypt(&key, nonce, &plaintext)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_atomic(output_path, &ciphertext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    debug!(
        variant = %variant,
        output = %output_path.display(),
        bytes = ciphertext.len(),
        "encrypted file"
    );
    Ok(())
}

/// Decrypt a file
///
/// Reads ciphertext from `input_path`, decrypts it under the key from
/// `key_reader` and `nonce`, and writes the plaintext to `output_path`.
/// Nothing is written unless authentication succeeds.
///
/// The output is written atomically with mode 0o600 on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    nonce: &[u8],
    variant: Variant,
    key_reader: &mut dyn KeyReader,
) -> Result<()> {
    let ciphertext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let key = key_reader.read_key()?;
    let plaintext = variant
        .decrypt(&key, nonce, &ciphertext)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_atomic(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    debug!(
        variant = %variant,
        output = %output_path.display(),
        bytes = plaintext.len(),
        "decrypted file"
    );
    Ok(())
}

/// Write `contents` to `path` via tempfile + fsync + rename
///
/// Either the previous file or the complete new one exists afterwards,
/// never a partial file.
fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| ChachaboxError::io(ErrorCategory::Internal, "failed to create tempfile", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                ChachaboxError::io(
                    ErrorCategory::Internal,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file
        .write_all(contents)
        .map_err(|e| ChachaboxError::io(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| ChachaboxError::io(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        ChachaboxError::io(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        ChachaboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> ChachaboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    ChachaboxError::io(
        category,
        format!("failed to read from {}", path.display()),
        err,
    )
}
