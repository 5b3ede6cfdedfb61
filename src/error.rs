use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee the error is not, for example,
    /// due to a user error - merely that it cannot be confidently determined
    /// by the code.
    Internal,

    /// The caller provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Key is not exactly 32 bytes.
    InvalidKeyLength,
    /// Nonce length does not match the selected variant.
    InvalidNonceLength,
    /// Ciphertext is too short to contain an authentication tag.
    InvalidCiphertext,
    /// Tag verification failed. Wrong key, wrong nonce, wrong associated
    /// data and tampering all map here and are not distinguished.
    AuthenticationFailed,
    /// The operating system entropy source could not supply bytes.
    RandomSourceUnavailable,
    /// The AEAD primitive refused to seal the input.
    CipherFailure,
    /// Text form of a key or nonce is not valid unpadded base64url.
    EncodingInvalid,
    /// Key could not be obtained from the configured reader.
    KeyUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct ChachaboxError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Errors raised by the codec always
    /// carry one; other consumers MUST handle the absence of a kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl ChachaboxError {
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The message carried by the error, without its source chain.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while keeping
    /// the original as source. The kind is carried over so callers can still
    /// branch on it.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }

    pub(crate) fn io(category: ErrorCategory, msg: impl Into<String>, err: std::io::Error) -> Self {
        Self::with_kind_and_source(category, ErrorKind::Io, msg, err)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ChachaboxError>;
