//! Key reading functionality
//!
//! Keys are exchanged as unpadded base64url text (see [`crate::encoding`]).
//! Every reader returns the decoded 32 bytes wrapped in `Zeroizing` so the
//! material is wiped when the caller drops it.

use crate::codec::KEY_LEN;
use crate::encoding;
use crate::error::{ChachaboxError, ErrorCategory, ErrorKind, Result};
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Trait for reading keys from various sources
pub trait KeyReader {
    /// Read a key, returning exactly `KEY_LEN` bytes.
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns a fixed key (for testing)
pub struct ConstantKeyReader {
    key: Zeroizing<Vec<u8>>,
}

impl ConstantKeyReader {
    /// Takes raw key bytes, not their text form.
    pub fn new(key: Vec<u8>) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }
}

impl KeyReader for ConstantKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        check_len(Zeroizing::new((*self.key).clone()))
    }
}

/// Reads an encoded key from any io::Read source
pub struct ReaderKeyReader {
    reader: Box<dyn Read>,
}

impl ReaderKeyReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl KeyReader for ReaderKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            ChachaboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::KeyUnavailable,
                format!("error reading key: {}", e),
                e,
            )
        })?;
        decode_key(&data)
    }
}

/// Reads an encoded key from a file
pub struct FileKeyReader {
    path: PathBuf,
}

impl FileKeyReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeyReader for FileKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let data = Zeroizing::new(fs::read(&self.path).map_err(|e| {
            let category = if e.kind() == io::ErrorKind::NotFound {
                ErrorCategory::User
            } else {
                ErrorCategory::Internal
            };
            ChachaboxError::with_kind_and_source(
                category,
                ErrorKind::KeyUnavailable,
                format!("failed to read key from {}", self.path.display()),
                e,
            )
        })?);
        decode_key(&data)
    }
}

/// Reads an encoded key from the terminal with no echo
#[derive(Default)]
pub struct TerminalKeyReader;

impl TerminalKeyReader {
    pub fn new() -> Self {
        Self
    }
}

impl KeyReader for TerminalKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(ChachaboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::KeyUnavailable,
                "cannot read key from terminal - stdin is not a terminal",
            ));
        }

        io::stderr()
            .write_all(b"Key (chachabox, base64url): ")
            .and_then(|_| io::stderr().flush())
            .map_err(|e| ChachaboxError::io(ErrorCategory::Internal, "failed to write prompt", e))?;

        let text = Zeroizing::new(rpassword::read_password().map_err(|e| {
            ChachaboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::KeyUnavailable,
                format!("failure reading key: {}", e),
                e,
            )
        })?);

        decode_key(text.as_bytes())
    }
}

fn decode_key(data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let text = std::str::from_utf8(data).map_err(|e| {
        ChachaboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::EncodingInvalid,
            "key is not valid UTF-8 text",
            e,
        )
    })?;
    let key = Zeroizing::new(encoding::decode(text).map_err(|e| e.with_context("invalid key"))?);
    check_len(key)
}

fn check_len(key: Zeroizing<Vec<u8>>) -> Result<Zeroizing<Vec<u8>>> {
    if key.len() != KEY_LEN {
        return Err(ChachaboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidKeyLength,
            format!("key must be {} bytes, got {}", KEY_LEN, key.len()),
        ));
    }
    Ok(key)
}
