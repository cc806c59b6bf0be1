//! Backend selection.
//!
//! A [`Backend`] is the single interface the legacy API dispatches through.
//! The backend is chosen once per process from [`BackendPreference`] by
//! [`install`]; later callers get the resolved instance from [`backend`].
//!
//! Only the pure engine is linked into this build, so `Native` fails with
//! [`CompatError::Unavailable`] and `Auto` resolves to [`PureBackend`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use natrium_crypto::pwhash::Algorithm;
use natrium_crypto::{
    CryptoError, aead, box_, curve25519, generichash, pwhash, random, secretbox, sign, stream,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::CompatConfig;
use crate::error::CompatError;

/// Which implementation the process should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Native if linked, otherwise pure
    #[default]
    Auto,
    /// Always the pure-Rust engine
    Pure,
    /// Native-accelerated library only
    Native,
}

impl BackendPreference {
    /// Lowercase name as written in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Pure => "pure",
            Self::Native => "native",
        }
    }

    /// Whether a backend reporting `is_native` satisfies this preference.
    #[must_use]
    pub const fn accepts(self, is_native: bool) -> bool {
        match self {
            Self::Auto => true,
            Self::Pure => !is_native,
            Self::Native => is_native,
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendPreference {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "pure" => Ok(Self::Pure),
            "native" => Ok(Self::Native),
            _ => Err(CompatError::UnknownBackend(s.to_string())),
        }
    }
}

/// AEAD constructions reachable through [`Backend::aead_encrypt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadCipher {
    /// Original ChaCha20-Poly1305, 8-byte nonce
    ChaCha20Poly1305,
    /// RFC 8439 ChaCha20-Poly1305, 12-byte nonce
    ChaCha20Poly1305Ietf,
    /// XChaCha20-Poly1305, 24-byte nonce
    XChaCha20Poly1305Ietf,
    /// AES-256-GCM, capability gated
    Aes256Gcm,
}

/// Extended-nonce stream ciphers reachable through [`Backend::stream_xor_ic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCipher {
    /// XSalsa20 (`crypto_stream`)
    XSalsa20,
    /// XChaCha20 (`crypto_stream_xchacha20`)
    XChaCha20,
}

/// A provider of the primitives the legacy API exposes.
///
/// Every method returns the engine's structured error; conversion to legacy
/// sentinels happens in [`Sodium`](crate::Sodium).
pub trait Backend: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this backend wraps a native library.
    fn is_native(&self) -> bool;

    /// Whether AES-256-GCM can be used.
    fn aes256gcm_is_available(&self) -> bool;

    /// Fill `buf` from the CSPRNG.
    ///
    /// # Errors
    /// Returns [`CryptoError::RandomFailed`] if the CSPRNG fails.
    fn fill_random(&self, buf: &mut [u8]) -> Result<(), CryptoError>;

    /// XOR `message` with the keystream starting at block `ic`.
    ///
    /// # Errors
    /// Returns a length error for a bad key or nonce.
    fn stream_xor_ic(
        &self,
        cipher: StreamCipher,
        message: &[u8],
        nonce: &[u8],
        ic: u64,
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// XSalsa20-Poly1305 `secretbox`.
    ///
    /// # Errors
    /// Returns a length error for a bad key or nonce.
    fn secretbox(&self, message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// XSalsa20-Poly1305 `secretbox_open`.
    ///
    /// # Errors
    /// Returns [`CryptoError::AuthenticationFailed`] on a bad tag.
    fn secretbox_open(&self, boxed: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Combined-mode AEAD encryption.
    ///
    /// # Errors
    /// Returns a length error, or [`CryptoError::Unavailable`] for AES-256-GCM.
    fn aead_encrypt(
        &self,
        cipher: AeadCipher,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Combined-mode AEAD decryption.
    ///
    /// # Errors
    /// Returns [`CryptoError::AuthenticationFailed`] on a bad tag.
    fn aead_decrypt(
        &self,
        cipher: AeadCipher,
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// X25519 scalar multiplication.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidPublicKey`] for an all-zero result.
    fn scalarmult(&self, n: &[u8], p: &[u8]) -> Result<[u8; 32], CryptoError>;

    /// Public-key authenticated encryption.
    ///
    /// # Errors
    /// Returns a length error or [`CryptoError::InvalidPublicKey`].
    fn box_easy(
        &self,
        message: &[u8],
        nonce: &[u8],
        public: &[u8],
        secret: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Public-key authenticated decryption.
    ///
    /// # Errors
    /// Returns [`CryptoError::AuthenticationFailed`] on a bad tag.
    fn box_open_easy(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        public: &[u8],
        secret: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Anonymous sealed box.
    ///
    /// # Errors
    /// Returns a length error or [`CryptoError::InvalidPublicKey`].
    fn box_seal(&self, message: &[u8], recipient_pk: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Open a sealed box with a 64-byte `secret ‖ public` keypair.
    ///
    /// # Errors
    /// Returns [`CryptoError::AuthenticationFailed`] on a bad tag.
    fn box_seal_open(&self, ciphertext: &[u8], keypair: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Ed25519 detached signature.
    ///
    /// # Errors
    /// Returns a length error for a secret key that is not 64 bytes.
    fn sign_detached(&self, message: &[u8], secret: &[u8]) -> Result<[u8; 64], CryptoError>;

    /// Ed25519 verification.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidSignature`] on mismatch.
    fn sign_verify_detached(
        &self,
        signature: &[u8],
        message: &[u8],
        public: &[u8],
    ) -> Result<(), CryptoError>;

    /// One-shot BLAKE2b.
    ///
    /// # Errors
    /// Returns a length error for out-of-range output or key sizes.
    fn generichash(&self, message: &[u8], key: &[u8], outlen: usize) -> Result<Vec<u8>, CryptoError>;

    /// Argon2 raw derivation.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidParameter`] for out-of-range limits.
    fn pwhash(
        &self,
        outlen: usize,
        passwd: &[u8],
        salt: &[u8],
        opslimit: u64,
        memlimit: usize,
        alg: Algorithm,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Argon2 encoded hash string.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidParameter`] for out-of-range limits.
    fn pwhash_str(
        &self,
        passwd: &[u8],
        opslimit: u64,
        memlimit: usize,
        alg: Algorithm,
    ) -> Result<String, CryptoError>;

    /// Verify a password against an Argon2 encoded hash string.
    ///
    /// # Errors
    /// Returns [`CryptoError::AuthenticationFailed`] on mismatch.
    fn pwhash_str_verify(&self, passwd: &[u8], hash: &str) -> Result<(), CryptoError>;
}

/// The pure-Rust engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PureBackend;

impl Backend for PureBackend {
    fn name(&self) -> &'static str {
        "pure"
    }

    fn is_native(&self) -> bool {
        false
    }

    fn aes256gcm_is_available(&self) -> bool {
        aead::aes256gcm::is_available()
    }

    fn fill_random(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        random::fill_random(buf)
    }

    fn stream_xor_ic(
        &self,
        cipher: StreamCipher,
        message: &[u8],
        nonce: &[u8],
        ic: u64,
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        match cipher {
            StreamCipher::XSalsa20 => stream::xsalsa20_xor_ic(message, nonce, ic, key),
            StreamCipher::XChaCha20 => stream::xchacha20_xor_ic(message, nonce, ic, key),
        }
    }

    fn secretbox(&self, message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        secretbox::secretbox(message, nonce, key)
    }

    fn secretbox_open(&self, boxed: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        secretbox::secretbox_open(boxed, nonce, key)
    }

    fn aead_encrypt(
        &self,
        cipher: AeadCipher,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        match cipher {
            AeadCipher::ChaCha20Poly1305 => aead::chacha20poly1305_encrypt(message, ad, nonce, key),
            AeadCipher::ChaCha20Poly1305Ietf => {
                aead::chacha20poly1305_ietf_encrypt(message, ad, nonce, key)
            }
            AeadCipher::XChaCha20Poly1305Ietf => {
                aead::xchacha20poly1305_ietf_encrypt(message, ad, nonce, key)
            }
            AeadCipher::Aes256Gcm => aead::aes256gcm::encrypt(message, ad, nonce, key),
        }
    }

    fn aead_decrypt(
        &self,
        cipher: AeadCipher,
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        match cipher {
            AeadCipher::ChaCha20Poly1305 => {
                aead::chacha20poly1305_decrypt(ciphertext, ad, nonce, key)
            }
            AeadCipher::ChaCha20Poly1305Ietf => {
                aead::chacha20poly1305_ietf_decrypt(ciphertext, ad, nonce, key)
            }
            AeadCipher::XChaCha20Poly1305Ietf => {
                aead::xchacha20poly1305_ietf_decrypt(ciphertext, ad, nonce, key)
            }
            AeadCipher::Aes256Gcm => aead::aes256gcm::decrypt(ciphertext, ad, nonce, key),
        }
    }

    fn scalarmult(&self, n: &[u8], p: &[u8]) -> Result<[u8; 32], CryptoError> {
        curve25519::scalarmult(n, p)
    }

    fn box_easy(
        &self,
        message: &[u8],
        nonce: &[u8],
        public: &[u8],
        secret: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        box_::easy(message, nonce, public, secret)
    }

    fn box_open_easy(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        public: &[u8],
        secret: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        box_::open_easy(ciphertext, nonce, public, secret)
    }

    fn box_seal(&self, message: &[u8], recipient_pk: &[u8]) -> Result<Vec<u8>, CryptoError> {
        box_::seal(message, recipient_pk)
    }

    fn box_seal_open(&self, ciphertext: &[u8], keypair: &[u8]) -> Result<Vec<u8>, CryptoError> {
        box_::seal_open(ciphertext, keypair)
    }

    fn sign_detached(&self, message: &[u8], secret: &[u8]) -> Result<[u8; 64], CryptoError> {
        sign::detached(message, secret)
    }

    fn sign_verify_detached(
        &self,
        signature: &[u8],
        message: &[u8],
        public: &[u8],
    ) -> Result<(), CryptoError> {
        sign::verify_detached(signature, message, public)
    }

    fn generichash(&self, message: &[u8], key: &[u8], outlen: usize) -> Result<Vec<u8>, CryptoError> {
        generichash::generichash(message, key, outlen)
    }

    fn pwhash(
        &self,
        outlen: usize,
        passwd: &[u8],
        salt: &[u8],
        opslimit: u64,
        memlimit: usize,
        alg: Algorithm,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        pwhash::pwhash(outlen, passwd, salt, opslimit, memlimit, alg)
    }

    fn pwhash_str(
        &self,
        passwd: &[u8],
        opslimit: u64,
        memlimit: usize,
        alg: Algorithm,
    ) -> Result<String, CryptoError> {
        pwhash::pwhash_str_alg(passwd, opslimit, memlimit, alg)
    }

    fn pwhash_str_verify(&self, passwd: &[u8], hash: &str) -> Result<(), CryptoError> {
        pwhash::pwhash_str_verify(passwd, hash)
    }
}

static PURE: PureBackend = PureBackend;

static INSTALLED: OnceLock<&'static dyn Backend> = OnceLock::new();

/// Map a preference to a backend without touching process state.
///
/// # Errors
///
/// Returns [`CompatError::Unavailable`] for [`BackendPreference::Native`].
pub fn resolve(preference: BackendPreference) -> Result<&'static dyn Backend, CompatError> {
    match preference {
        BackendPreference::Pure => Ok(&PURE),
        BackendPreference::Auto => {
            tracing::debug!("no native backend linked, auto resolves to pure");
            Ok(&PURE)
        }
        BackendPreference::Native => {
            tracing::warn!("native backend requested but none is linked");
            Err(CompatError::Unavailable(preference))
        }
    }
}

/// Resolve the configured backend and make it the process-wide choice.
///
/// The first successful call wins. Later calls return the installed
/// backend, with a warning if it does not satisfy the new preference.
///
/// # Errors
///
/// Returns [`CompatError::Unavailable`] if nothing is installed yet and the
/// preference cannot be satisfied.
pub fn install(config: &CompatConfig) -> Result<&'static dyn Backend, CompatError> {
    let preference = config.backend.preference;

    if let Some(current) = INSTALLED.get() {
        if !preference.accepts(current.is_native()) {
            tracing::warn!(
                installed = current.name(),
                requested = %preference,
                "backend already installed, ignoring new preference"
            );
        }
        return Ok(*current);
    }

    let resolved = resolve(preference)?;
    let installed = *INSTALLED.get_or_init(|| {
        tracing::info!(backend = resolved.name(), preference = %preference, "crypto backend selected");
        resolved
    });
    Ok(installed)
}

/// The process-wide backend, installing the pure engine if [`install`] was
/// never called.
#[must_use]
pub fn backend() -> &'static dyn Backend {
    *INSTALLED.get_or_init(|| {
        tracing::debug!("no backend installed, defaulting to pure");
        &PURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_parsing() {
        assert_eq!("auto".parse::<BackendPreference>().unwrap(), BackendPreference::Auto);
        assert_eq!(" PURE ".parse::<BackendPreference>().unwrap(), BackendPreference::Pure);
        assert_eq!("Native".parse::<BackendPreference>().unwrap(), BackendPreference::Native);
        assert!(matches!(
            "fast".parse::<BackendPreference>(),
            Err(CompatError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_preference_display_round_trip() {
        for pref in [BackendPreference::Auto, BackendPreference::Pure, BackendPreference::Native] {
            assert_eq!(pref.to_string().parse::<BackendPreference>().unwrap(), pref);
        }
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(BackendPreference::Auto).unwrap().name(), "pure");
        assert_eq!(resolve(BackendPreference::Pure).unwrap().name(), "pure");
        assert!(matches!(
            resolve(BackendPreference::Native),
            Err(CompatError::Unavailable(BackendPreference::Native))
        ));
    }

    #[test]
    fn test_accepts() {
        assert!(BackendPreference::Auto.accepts(false));
        assert!(BackendPreference::Pure.accepts(false));
        assert!(!BackendPreference::Native.accepts(false));
        assert!(!BackendPreference::Pure.accepts(true));
    }

    #[test]
    fn test_install_is_idempotent() {
        let config = CompatConfig::default();
        let first = install(&config).unwrap();
        let second = install(&config).unwrap();
        assert_eq!(first.name(), second.name());
        assert_eq!(backend().name(), "pure");
    }

    #[test]
    fn test_pure_backend_aes_gate() {
        let b = PureBackend;
        assert!(!b.aes256gcm_is_available());
        assert!(matches!(
            b.aead_encrypt(AeadCipher::Aes256Gcm, b"m", b"", &[0; 12], &[0; 32]),
            Err(CryptoError::Unavailable(_))
        ));
    }

    #[test]
    fn test_pure_backend_stream_ciphers_differ() {
        let b = PureBackend;
        let xs = b
            .stream_xor_ic(StreamCipher::XSalsa20, &[0; 32], &[1; 24], 0, &[2; 32])
            .unwrap();
        let xc = b
            .stream_xor_ic(StreamCipher::XChaCha20, &[0; 32], &[1; 24], 0, &[2; 32])
            .unwrap();
        assert_ne!(xs, xc);
        assert_eq!(xs, stream::xsalsa20(32, &[1; 24], &[2; 32]).unwrap());
    }
}
