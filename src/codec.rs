//! Stateless encrypt/decrypt/nonce generation over ChaCha20-Poly1305
//!
//! Every call builds its own cipher from the caller's key and drops it on
//! return. Nothing is shared between calls, so all functions may be used
//! concurrently without coordination.
//!
//! The ciphertext layout is the one produced by the underlying AEAD: the
//! encrypted bytes followed by a 16-byte Poly1305 tag.

use std::marker::PhantomData;

use chacha20poly1305::aead::{Aead, KeyInit, Nonce, Payload};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, trace};

use crate::error::{ChachaboxError, ErrorCategory, ErrorKind, Result};
use crate::variant::AeadVariant;

/// Length of key in bytes
pub const KEY_LEN: usize = 32;

/// Length of Poly1305 authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// AEAD codec for one nonce variant.
///
/// The type is never instantiated; all operations are associated functions
/// so the variant is fixed by the type parameter alone.
#[derive(Debug)]
pub struct Codec<V: AeadVariant> {
    _variant: PhantomData<fn() -> V>,
}

impl<V: AeadVariant> Codec<V> {
    /// Nonce length in bytes for this codec.
    pub const NONCE_LEN: usize = V::NONCE_LEN;

    /// Encrypt `plaintext` with no associated data.
    ///
    /// Returns `plaintext.len() + TAG_LEN` bytes.
    pub fn encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        Self::encrypt_with_aad(key, nonce, plaintext, &[])
    }

    /// Decrypt `ciphertext` produced by [`Codec::encrypt`].
    pub fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        Self::decrypt_with_aad(key, nonce, ciphertext, &[])
    }

    /// Encrypt `plaintext`, authenticating `aad` alongside it.
    ///
    /// The same `aad` must be supplied to decrypt. An empty `aad` is
    /// identical to [`Codec::encrypt`].
    pub fn encrypt_with_aad(
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = new_cipher::<V>(key)?;
        let nonce = checked_nonce::<V>(nonce)?;

        trace!(
            variant = V::NAME,
            plaintext_len = plaintext.len(),
            aad_len = aad.len(),
            "sealing"
        );

        cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| {
                ChachaboxError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::CipherFailure,
                    "encryption failed",
                )
            })
    }

    /// Decrypt `ciphertext`, verifying the tag over it and `aad` before any
    /// plaintext is released.
    ///
    /// A wrong key, wrong nonce, wrong `aad` or modified ciphertext all yield
    /// the same [`ErrorKind::AuthenticationFailed`] error.
    pub fn decrypt_with_aad(
        key: &[u8],
        nonce: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = new_cipher::<V>(key)?;
        let nonce = checked_nonce::<V>(nonce)?;

        if ciphertext.len() < TAG_LEN {
            return Err(ChachaboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidCiphertext,
                format!(
                    "ciphertext too short: {} bytes, need at least {}",
                    ciphertext.len(),
                    TAG_LEN
                ),
            ));
        }

        trace!(
            variant = V::NAME,
            ciphertext_len = ciphertext.len(),
            aad_len = aad.len(),
            "opening"
        );

        cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| {
                debug!(variant = V::NAME, "authentication tag mismatch");
                ChachaboxError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::AuthenticationFailed,
                    "corrupt input, tampered-with data, or wrong key or nonce",
                )
            })
    }

    /// Generate a nonce from the operating system CSPRNG.
    pub fn generate_nonce() -> Result<V::Nonce> {
        Self::generate_nonce_with(&mut OsRng)
    }

    /// Generate a nonce from the given cryptographic RNG.
    pub fn generate_nonce_with<R>(rng: &mut R) -> Result<V::Nonce>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let mut nonce = V::Nonce::default();
        rng.try_fill_bytes(nonce.as_mut()).map_err(|e| {
            debug!(variant = V::NAME, error = %e, "entropy source failed");
            ChachaboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::RandomSourceUnavailable,
                "random source unavailable",
                e,
            )
        })?;
        Ok(nonce)
    }
}

fn new_cipher<V: AeadVariant>(key: &[u8]) -> Result<V::Cipher> {
    if key.len() != KEY_LEN {
        return Err(ChachaboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidKeyLength,
            format!(
                "invalid key length: expected {} bytes, got {}",
                KEY_LEN,
                key.len()
            ),
        ));
    }
    <V::Cipher as KeyInit>::new_from_slice(key).map_err(|_| {
        ChachaboxError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InvalidKeyLength,
            "cipher rejected key",
        )
    })
}

fn checked_nonce<V: AeadVariant>(nonce: &[u8]) -> Result<&Nonce<V::Cipher>> {
    if nonce.len() != V::NONCE_LEN {
        return Err(ChachaboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidNonceLength,
            format!(
                "invalid nonce length for {} variant: expected {} bytes, got {}",
                V::NAME,
                V::NONCE_LEN,
                nonce.len()
            ),
        ));
    }
    Ok(Nonce::<V::Cipher>::from_slice(nonce))
}
