//! Nonce variants of the ChaCha20-Poly1305 construction
//!
//! The variant is fixed per deployment: at compile time through the
//! [`AeadVariant`] type parameter of [`Codec`](crate::codec::Codec), or once
//! at startup through the runtime [`Variant`] selector. Operations for a
//! given codec never mix nonce sizes.

use std::fmt;
use std::str::FromStr;

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, XChaCha20Poly1305};

use crate::codec::Codec;
use crate::error::{ChachaboxError, ErrorCategory, Result};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Standard {}
    impl Sealed for super::Extended {}
}

/// Compile-time description of one AEAD variant.
pub trait AeadVariant: sealed::Sealed + Send + Sync + 'static {
    /// The RustCrypto cipher implementing the construction.
    type Cipher: Aead + KeyInit;

    /// Fixed-size nonce buffer.
    type Nonce: AsRef<[u8]>
        + AsMut<[u8]>
        + Copy
        + Default
        + Eq
        + std::hash::Hash
        + fmt::Debug
        + Send
        + Sync;

    /// Nonce length in bytes.
    const NONCE_LEN: usize;

    /// Lower-case name, as accepted by [`Variant::from_str`].
    const NAME: &'static str;
}

/// ChaCha20-Poly1305 with a 12-byte nonce (RFC 8439).
///
/// Random 12-byte nonces start colliding with noticeable probability around
/// 2^32 messages per key. Callers using this variant with high message
/// volumes are responsible for nonce uniqueness, e.g. with a counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standard;

impl AeadVariant for Standard {
    type Cipher = ChaCha20Poly1305;
    type Nonce = [u8; 12];
    const NONCE_LEN: usize = 12;
    const NAME: &'static str = "standard";
}

/// XChaCha20-Poly1305 with a 24-byte nonce.
///
/// A sub-key is derived from the first 16 nonce bytes, which makes purely
/// random nonces safe far beyond any realistic message volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extended;

impl AeadVariant for Extended {
    type Cipher = XChaCha20Poly1305;
    type Nonce = [u8; 24];
    const NONCE_LEN: usize = 24;
    const NAME: &'static str = "extended";
}

/// Runtime selector for deployments that pick the variant from
/// configuration rather than from a type parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    Standard,
    #[default]
    Extended,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Standard => Standard::NAME,
            Variant::Extended => Extended::NAME,
        }
    }

    pub fn nonce_len(self) -> usize {
        match self {
            Variant::Standard => Standard::NONCE_LEN,
            Variant::Extended => Extended::NONCE_LEN,
        }
    }

    pub fn encrypt(self, key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with_aad(key, nonce, plaintext, &[])
    }

    pub fn decrypt(self, key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_with_aad(key, nonce, ciphertext, &[])
    }

    pub fn encrypt_with_aad(
        self,
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        match self {
            Variant::Standard => Codec::<Standard>::encrypt_with_aad(key, nonce, plaintext, aad),
            Variant::Extended => Codec::<Extended>::encrypt_with_aad(key, nonce, plaintext, aad),
        }
    }

    pub fn decrypt_with_aad(
        self,
        key: &[u8],
        nonce: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        match self {
            Variant::Standard => Codec::<Standard>::decrypt_with_aad(key, nonce, ciphertext, aad),
            Variant::Extended => Codec::<Extended>::decrypt_with_aad(key, nonce, ciphertext, aad),
        }
    }

    /// Generates a nonce of this variant's length from the OS CSPRNG.
    pub fn generate_nonce(self) -> Result<Vec<u8>> {
        match self {
            Variant::Standard => Codec::<Standard>::generate_nonce().map(|n| n.to_vec()),
            Variant::Extended => Codec::<Extended>::generate_nonce().map(|n| n.to_vec()),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ChachaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(Variant::Standard),
            "extended" => Ok(Variant::Extended),
            other => Err(ChachaboxError::new(
                ErrorCategory::User,
                format!("unknown variant {other:?}; expected \"standard\" or \"extended\""),
            )),
        }
    }
}
