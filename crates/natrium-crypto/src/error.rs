//! Cryptographic error types.

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid key length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid nonce length
    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A buffer other than a key or nonce has the wrong length
    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Which argument was rejected
        what: &'static str,
        /// Expected length (or minimum, for variable-length inputs)
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// MAC or AEAD tag verification failed
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Invalid signature
    #[error("invalid signature")]
    InvalidSignature,

    /// Invalid public key (non-canonical, small order, or all-zero shared secret)
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Primitive not available in this build
    #[error("{0} is not available")]
    Unavailable(&'static str),

    /// Message exceeds the keystream or counter limit of the cipher
    #[error("message too long")]
    MessageTooLong,

    /// Malformed encoded input (hex, base64, password hash string)
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Random number generation failed
    #[error("random number generation failed")]
    RandomFailed,
}

impl CryptoError {
    /// Convenience constructor for a rejected buffer length.
    #[must_use]
    pub fn length(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            what,
            expected,
            actual,
        }
    }

    /// Whether this error is a verification failure rather than a usage error.
    ///
    /// The legacy boundary collapses these into a `false` return.
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::InvalidSignature | Self::InvalidPublicKey
        )
    }
}

/// Borrow `key` as a fixed-size array, rejecting any other length.
pub(crate) fn key_array<const N: usize>(key: &[u8]) -> Result<&[u8; N], CryptoError> {
    key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: N,
        actual: key.len(),
    })
}

/// Borrow `nonce` as a fixed-size array, rejecting any other length.
pub(crate) fn nonce_array<const N: usize>(nonce: &[u8]) -> Result<&[u8; N], CryptoError> {
    nonce.try_into().map_err(|_| CryptoError::InvalidNonceLength {
        expected: N,
        actual: nonce.len(),
    })
}

/// Borrow any other fixed-size argument as an array.
pub(crate) fn fixed_array<'a, const N: usize>(
    what: &'static str,
    bytes: &'a [u8],
) -> Result<&'a [u8; N], CryptoError> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::length(what, N, bytes.len()))
}
