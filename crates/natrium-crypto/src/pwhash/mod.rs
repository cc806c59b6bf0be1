//! Password hashing (`crypto_pwhash`).
//!
//! Argon2i and Argon2id (version 0x13, one lane) through the `argon2` crate,
//! producing and verifying PHC-format strings. Memory limits are given in
//! bytes as in libsodium and converted to KiB for Argon2.
//!
//! The legacy scrypt construction (`$7$` strings) lives in [`scrypt`].

mod argon;
pub mod scrypt;

use serde::{Deserialize, Serialize};

use crate::CryptoError;

pub use argon::{pwhash, pwhash_str, pwhash_str_alg, pwhash_str_needs_rehash, pwhash_str_verify};
pub use scrypt::{
    pwhash_scryptsalsa208sha256, pwhash_scryptsalsa208sha256_str,
    pwhash_scryptsalsa208sha256_str_needs_rehash, pwhash_scryptsalsa208sha256_str_verify,
};

/// Salt size.
pub const SALT_BYTES: usize = 16;

/// Minimum derived key length.
pub const BYTES_MIN: usize = 16;

/// Maximum length of an encoded hash string.
pub const STR_BYTES: usize = 128;

/// Minimum memory limit in bytes.
pub const MEMLIMIT_MIN: usize = 8192;

/// Minimum opslimit for Argon2id.
pub const OPSLIMIT_MIN: u64 = 1;

/// Minimum opslimit for Argon2i.
pub const ARGON2I_OPSLIMIT_MIN: u64 = 3;

/// Maximum opslimit.
pub const OPSLIMIT_MAX: u64 = u32::MAX as u64;

/// Argon2id interactive opslimit.
pub const OPSLIMIT_INTERACTIVE: u64 = 2;

/// Argon2id interactive memlimit (64 MiB).
pub const MEMLIMIT_INTERACTIVE: usize = 67_108_864;

/// Argon2id moderate opslimit.
pub const OPSLIMIT_MODERATE: u64 = 3;

/// Argon2id moderate memlimit (256 MiB).
pub const MEMLIMIT_MODERATE: usize = 268_435_456;

/// Argon2id sensitive opslimit.
pub const OPSLIMIT_SENSITIVE: u64 = 4;

/// Argon2id sensitive memlimit (1 GiB).
pub const MEMLIMIT_SENSITIVE: usize = 1_073_741_824;

/// Argon2 variant, numbered as libsodium numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Argon2i v1.3 (`crypto_pwhash_ALG_ARGON2I13`).
    Argon2i13 = 1,
    /// Argon2id v1.3 (`crypto_pwhash_ALG_ARGON2ID13`).
    #[default]
    Argon2id13 = 2,
}

impl Algorithm {
    /// Map a libsodium algorithm identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameter`] for unknown identifiers.
    pub fn from_id(id: i32) -> Result<Self, CryptoError> {
        match id {
            1 => Ok(Self::Argon2i13),
            2 => Ok(Self::Argon2id13),
            other => Err(CryptoError::InvalidParameter(format!(
                "unknown password hashing algorithm {other}"
            ))),
        }
    }

    /// The lowest opslimit the variant accepts.
    #[must_use]
    pub const fn opslimit_min(self) -> u64 {
        match self {
            Self::Argon2i13 => ARGON2I_OPSLIMIT_MIN,
            Self::Argon2id13 => OPSLIMIT_MIN,
        }
    }
}

/// Named cost presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Online logins.
    Interactive,
    /// Higher-value secrets.
    Moderate,
    /// Offline key derivation for highly sensitive data.
    Sensitive,
}

impl Preset {
    /// `(opslimit, memlimit)` of this preset for `alg`.
    #[must_use]
    pub const fn limits(self, alg: Algorithm) -> (u64, usize) {
        match (alg, self) {
            (Algorithm::Argon2id13, Self::Interactive) => {
                (OPSLIMIT_INTERACTIVE, MEMLIMIT_INTERACTIVE)
            }
            (Algorithm::Argon2id13, Self::Moderate) => (OPSLIMIT_MODERATE, MEMLIMIT_MODERATE),
            (Algorithm::Argon2id13, Self::Sensitive) => (OPSLIMIT_SENSITIVE, MEMLIMIT_SENSITIVE),
            (Algorithm::Argon2i13, Self::Interactive) => (4, 33_554_432),
            (Algorithm::Argon2i13, Self::Moderate) => (6, 134_217_728),
            (Algorithm::Argon2i13, Self::Sensitive) => (8, 536_870_912),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_ids() {
        assert_eq!(Algorithm::from_id(1).unwrap(), Algorithm::Argon2i13);
        assert_eq!(Algorithm::from_id(2).unwrap(), Algorithm::Argon2id13);
        assert!(Algorithm::from_id(0).is_err());
        assert_eq!(Algorithm::default() as i32, 2);
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            Preset::Interactive.limits(Algorithm::Argon2id13),
            (OPSLIMIT_INTERACTIVE, MEMLIMIT_INTERACTIVE)
        );
        assert_eq!(Preset::Sensitive.limits(Algorithm::Argon2i13), (8, 536_870_912));
        for preset in [Preset::Interactive, Preset::Moderate, Preset::Sensitive] {
            for alg in [Algorithm::Argon2i13, Algorithm::Argon2id13] {
                let (ops, mem) = preset.limits(alg);
                assert!(ops >= alg.opslimit_min());
                assert!(mem >= MEMLIMIT_MIN);
            }
        }
    }
}
