//! Chachabox - stateless ChaCha20-Poly1305 encryption helpers
//!
//! The crate-root functions use the extended-nonce (XChaCha20-Poly1305)
//! variant, for which random nonces from [`generate_nonce`] are safe. Use
//! [`Codec<Standard>`](codec::Codec) for the 12-byte RFC 8439 construction.

#![forbid(unsafe_code)]

pub mod codec;
pub mod encoding;
pub mod error;
pub mod file_ops;
pub mod keys;
pub mod variant;

pub use codec::{Codec, KEY_LEN, TAG_LEN};
pub use error::{ChachaboxError, ErrorCategory, ErrorKind, Result};
pub use variant::{AeadVariant, Extended, Standard, Variant};

/// Encrypt `plaintext` with XChaCha20-Poly1305. `nonce` must be 24 bytes.
pub fn encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    Codec::<Extended>::encrypt(key, nonce, plaintext)
}

/// Decrypt `ciphertext` produced by [`encrypt`].
pub fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    Codec::<Extended>::decrypt(key, nonce, ciphertext)
}

/// Generate a random 24-byte nonce for [`encrypt`].
pub fn generate_nonce() -> Result<[u8; 24]> {
    Codec::<Extended>::generate_nonce()
}
