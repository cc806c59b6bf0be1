//! AES-256-GCM capability gate.
//!
//! libsodium only offers AES-256-GCM on CPUs with hardware AES and carry-less
//! multiplication. This engine carries no AES implementation, so the gate is
//! always closed and every operation reports [`CryptoError::Unavailable`].

use crate::CryptoError;

/// AES-256-GCM key size.
pub const KEY_SIZE: usize = 32;

/// AES-256-GCM nonce size.
pub const NONCE_SIZE: usize = 12;

/// AES-256-GCM tag size.
pub const TAG_SIZE: usize = 16;

const NAME: &str = "aes256gcm";

/// Whether AES-256-GCM can be used. Always `false` here.
#[must_use]
pub const fn is_available() -> bool {
    false
}

/// # Errors
///
/// Always returns [`CryptoError::Unavailable`].
pub fn encrypt(
    _message: &[u8],
    _ad: &[u8],
    _nonce: &[u8],
    _key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    tracing::debug!("aes256gcm requested but not available");
    Err(CryptoError::Unavailable(NAME))
}

/// # Errors
///
/// Always returns [`CryptoError::Unavailable`].
pub fn decrypt(
    _ciphertext: &[u8],
    _ad: &[u8],
    _nonce: &[u8],
    _key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    tracing::debug!("aes256gcm requested but not available");
    Err(CryptoError::Unavailable(NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_closed() {
        assert!(!is_available());
        assert_eq!(
            encrypt(b"m", b"", &[0u8; 12], &[0u8; 32]),
            Err(CryptoError::Unavailable("aes256gcm"))
        );
        assert!(matches!(
            decrypt(&[0u8; 32], b"", &[0u8; 12], &[0u8; 32]),
            Err(CryptoError::Unavailable(_))
        ));
    }
}
