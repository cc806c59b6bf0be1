//! Unauthenticated stream ciphers.
//!
//! The default stream cipher is XSalsa20. None of these provide integrity;
//! use [`secretbox`](crate::secretbox) or [`aead`](crate::aead) for that.

pub mod chacha20;
pub mod salsa20;

pub use chacha20::{
    ChaCha20, chacha20, chacha20_ietf, chacha20_ietf_xor, chacha20_ietf_xor_ic, chacha20_xor,
    chacha20_xor_ic, hchacha20, xchacha20, xchacha20_xor, xchacha20_xor_ic,
};
pub use salsa20::{
    hsalsa20, salsa20, salsa20_xor, salsa20_xor_ic, xsalsa20, xsalsa20_xor, xsalsa20_xor_ic,
};

use crate::CryptoError;
use crate::random::random_32;

/// Default stream key size.
pub const KEY_SIZE: usize = 32;

/// Default stream nonce size.
pub const NONCE_SIZE: usize = 24;

/// XSalsa20 keystream of `len` bytes.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn stream(len: usize, nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xsalsa20(len, nonce, key)
}

/// Encrypt or decrypt `message` with XSalsa20.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn stream_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xsalsa20_xor(message, nonce, key)
}

/// Encrypt or decrypt `message` with XSalsa20 starting at block `ic`.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn stream_xor_ic(
    message: &[u8],
    nonce: &[u8],
    ic: u64,
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    xsalsa20_xor_ic(message, nonce, ic, key)
}

/// Generate a random stream key.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn keygen() -> Result<[u8; KEY_SIZE], CryptoError> {
    random_32()
}
