//! Text form for keys and nonces
//!
//! Binary material that has to pass through a terminal, a shell argument or
//! a small text file is written as unpadded base64url. The encoded form is:
//! - Free of whitespace (including newlines)
//! - Safe to embed in URLs
//! - Safe to pass unescaped in a POSIX shell

use crate::error::{ChachaboxError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Encode bytes as unpadded base64url.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url, ignoring leading and trailing whitespace.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(text.trim()).map_err(|e| {
        ChachaboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::EncodingInvalid,
            format!("base64url decoding failed: {}", e),
            e,
        )
    })
}

/// Decode a value that must have an exact length, such as a nonce.
///
/// `kind` is reported when the decoded length is wrong.
pub fn decode_exact(text: &str, expected: usize, what: &str, kind: ErrorKind) -> Result<Vec<u8>> {
    let bytes = decode(text).map_err(|e| e.with_context(format!("invalid {}", what)))?;
    if bytes.len() != expected {
        return Err(ChachaboxError::with_kind(
            ErrorCategory::User,
            kind,
            format!(
                "{} must decode to {} bytes, got {}",
                what,
                expected,
                bytes.len()
            ),
        ));
    }
    Ok(bytes)
}
