//! libsodium-named legacy API.
//!
//! Calls whose legacy form returns `false` on failure (open, decrypt,
//! verify) return `Option<T>` or `bool`. Rejected input on those paths is
//! logged at debug level and collapses to the same sentinel as an
//! authentication failure. All other calls return
//! `Result<T, CompatError>`.
//!
//! Legacy box keypairs are 64 bytes `secret ‖ public`. For `crypto_box` and
//! `crypto_box_open` the pair is *my* secret key followed by *their* public
//! key, as built by `crypto_box_keypair_from_secretkey_and_publickey`.

use natrium_crypto::generichash::GenericHashState;
use natrium_crypto::kx::SessionKeys;
use natrium_crypto::pwhash::Algorithm;
use natrium_crypto::{
    CryptoError, box_, codec, constant_time, generichash, kx, poly1305, pwhash, random, secretbox,
    shorthash, sign,
};
use zeroize::Zeroizing;

use crate::backend::{AeadCipher, Backend, StreamCipher, backend};
use crate::error::CompatError;

/// Collapse a verification-path result into the legacy sentinel.
fn sentinel<T>(op: &'static str, result: Result<T, CryptoError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_verification_failure() => None,
        Err(err) => {
            tracing::debug!(op, error = %err, "legacy call rejected input");
            None
        }
    }
}

fn split_box_keypair(keypair: &[u8]) -> Result<(&[u8], &[u8]), CryptoError> {
    if keypair.len() != box_::KEYPAIR_SIZE {
        return Err(CryptoError::length(
            "keypair",
            box_::KEYPAIR_SIZE,
            keypair.len(),
        ));
    }
    Ok(keypair.split_at(box_::SECRET_KEY_SIZE))
}

/// Legacy entry points dispatched through a [`Backend`].
#[derive(Debug, Clone, Copy)]
pub struct Sodium {
    backend: &'static dyn Backend,
}

impl Default for Sodium {
    fn default() -> Self {
        Self::new()
    }
}

impl Sodium {
    /// Use the process-wide backend.
    #[must_use]
    pub fn new() -> Self {
        Self { backend: backend() }
    }

    /// Use a specific backend.
    #[must_use]
    pub fn with_backend(backend: &'static dyn Backend) -> Self {
        Self { backend }
    }

    /// The backend this instance dispatches to.
    #[must_use]
    pub fn backend(&self) -> &'static dyn Backend {
        self.backend
    }

    fn random_key(&self) -> Result<[u8; 32], CompatError> {
        let mut key = [0u8; 32];
        self.backend.fill_random(&mut key)?;
        Ok(key)
    }

    // ========================================================================
    // Stream
    // ========================================================================

    /// `crypto_stream`: `len` bytes of XSalsa20 keystream.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_stream(&self, len: usize, nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CompatError> {
        Ok(self
            .backend
            .stream_xor_ic(StreamCipher::XSalsa20, &vec![0u8; len], nonce, 0, key)?)
    }

    /// `crypto_stream_xor`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_stream_xor(
        &self,
        message: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        self.crypto_stream_xor_ic(message, nonce, 0, key)
    }

    /// `crypto_stream_xor_ic`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_stream_xor_ic(
        &self,
        message: &[u8],
        nonce: &[u8],
        ic: u64,
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self
            .backend
            .stream_xor_ic(StreamCipher::XSalsa20, message, nonce, ic, key)?)
    }

    /// `crypto_stream_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_stream_keygen(&self) -> Result<[u8; 32], CompatError> {
        self.random_key()
    }

    /// `crypto_stream_xchacha20`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_stream_xchacha20(
        &self,
        len: usize,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        self.crypto_stream_xchacha20_xor_ic(&vec![0u8; len], nonce, 0, key)
    }

    /// `crypto_stream_xchacha20_xor`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_stream_xchacha20_xor(
        &self,
        message: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        self.crypto_stream_xchacha20_xor_ic(message, nonce, 0, key)
    }

    /// `crypto_stream_xchacha20_xor_ic`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_stream_xchacha20_xor_ic(
        &self,
        message: &[u8],
        nonce: &[u8],
        ic: u64,
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self
            .backend
            .stream_xor_ic(StreamCipher::XChaCha20, message, nonce, ic, key)?)
    }

    /// `crypto_stream_xchacha20_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_stream_xchacha20_keygen(&self) -> Result<[u8; 32], CompatError> {
        self.random_key()
    }

    // ========================================================================
    // Secret-key authenticated encryption
    // ========================================================================

    /// `crypto_secretbox`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_secretbox(
        &self,
        message: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self.backend.secretbox(message, nonce, key)?)
    }

    /// `crypto_secretbox_open`: `None` where the legacy call returns `false`.
    #[must_use]
    pub fn crypto_secretbox_open(&self, boxed: &[u8], nonce: &[u8], key: &[u8]) -> Option<Vec<u8>> {
        sentinel("crypto_secretbox_open", self.backend.secretbox_open(boxed, nonce, key))
    }

    /// `crypto_secretbox_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_secretbox_keygen(&self) -> Result<[u8; 32], CompatError> {
        self.random_key()
    }

    /// `crypto_secretbox_xchacha20poly1305`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_secretbox_xchacha20poly1305(
        &self,
        message: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(secretbox::secretbox_xchacha20poly1305(message, nonce, key)?)
    }

    /// `crypto_secretbox_xchacha20poly1305_open`.
    #[must_use]
    pub fn crypto_secretbox_xchacha20poly1305_open(
        &self,
        boxed: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Option<Vec<u8>> {
        sentinel(
            "crypto_secretbox_xchacha20poly1305_open",
            secretbox::secretbox_xchacha20poly1305_open(boxed, nonce, key),
        )
    }

    // ========================================================================
    // AEAD
    // ========================================================================

    /// `crypto_aead_chacha20poly1305_encrypt` (8-byte nonce).
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_aead_chacha20poly1305_encrypt(
        &self,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self
            .backend
            .aead_encrypt(AeadCipher::ChaCha20Poly1305, message, ad, nonce, key)?)
    }

    /// `crypto_aead_chacha20poly1305_decrypt`.
    #[must_use]
    pub fn crypto_aead_chacha20poly1305_decrypt(
        &self,
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Option<Vec<u8>> {
        sentinel(
            "crypto_aead_chacha20poly1305_decrypt",
            self.backend
                .aead_decrypt(AeadCipher::ChaCha20Poly1305, ciphertext, ad, nonce, key),
        )
    }

    /// `crypto_aead_chacha20poly1305_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_aead_chacha20poly1305_keygen(&self) -> Result<[u8; 32], CompatError> {
        self.random_key()
    }

    /// `crypto_aead_chacha20poly1305_ietf_encrypt` (12-byte nonce).
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_aead_chacha20poly1305_ietf_encrypt(
        &self,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self
            .backend
            .aead_encrypt(AeadCipher::ChaCha20Poly1305Ietf, message, ad, nonce, key)?)
    }

    /// `crypto_aead_chacha20poly1305_ietf_decrypt`.
    #[must_use]
    pub fn crypto_aead_chacha20poly1305_ietf_decrypt(
        &self,
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Option<Vec<u8>> {
        sentinel(
            "crypto_aead_chacha20poly1305_ietf_decrypt",
            self.backend
                .aead_decrypt(AeadCipher::ChaCha20Poly1305Ietf, ciphertext, ad, nonce, key),
        )
    }

    /// `crypto_aead_chacha20poly1305_ietf_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_aead_chacha20poly1305_ietf_keygen(&self) -> Result<[u8; 32], CompatError> {
        self.random_key()
    }

    /// `crypto_aead_xchacha20poly1305_ietf_encrypt` (24-byte nonce).
    ///
    /// # Errors
    ///
    /// Returns a length error for a bad key or nonce.
    pub fn crypto_aead_xchacha20poly1305_ietf_encrypt(
        &self,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self
            .backend
            .aead_encrypt(AeadCipher::XChaCha20Poly1305Ietf, message, ad, nonce, key)?)
    }

    /// `crypto_aead_xchacha20poly1305_ietf_decrypt`.
    #[must_use]
    pub fn crypto_aead_xchacha20poly1305_ietf_decrypt(
        &self,
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Option<Vec<u8>> {
        sentinel(
            "crypto_aead_xchacha20poly1305_ietf_decrypt",
            self.backend
                .aead_decrypt(AeadCipher::XChaCha20Poly1305Ietf, ciphertext, ad, nonce, key),
        )
    }

    /// `crypto_aead_xchacha20poly1305_ietf_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_aead_xchacha20poly1305_ietf_keygen(&self) -> Result<[u8; 32], CompatError> {
        self.random_key()
    }

    /// `crypto_aead_aes256gcm_is_available`.
    #[must_use]
    pub fn crypto_aead_aes256gcm_is_available(&self) -> bool {
        self.backend.aes256gcm_is_available()
    }

    /// `crypto_aead_aes256gcm_encrypt`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Unavailable`] unless the backend supports it.
    pub fn crypto_aead_aes256gcm_encrypt(
        &self,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self
            .backend
            .aead_encrypt(AeadCipher::Aes256Gcm, message, ad, nonce, key)?)
    }

    /// `crypto_aead_aes256gcm_decrypt`.
    #[must_use]
    pub fn crypto_aead_aes256gcm_decrypt(
        &self,
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Option<Vec<u8>> {
        sentinel(
            "crypto_aead_aes256gcm_decrypt",
            self.backend
                .aead_decrypt(AeadCipher::Aes256Gcm, ciphertext, ad, nonce, key),
        )
    }

    // ========================================================================
    // One-time authentication
    // ========================================================================

    /// `crypto_onetimeauth`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a key that is not 32 bytes.
    pub fn crypto_onetimeauth(&self, message: &[u8], key: &[u8]) -> Result<[u8; 16], CompatError> {
        Ok(poly1305::onetimeauth(message, key)?)
    }

    /// `crypto_onetimeauth_verify`.
    #[must_use]
    pub fn crypto_onetimeauth_verify(&self, mac: &[u8], message: &[u8], key: &[u8]) -> bool {
        sentinel(
            "crypto_onetimeauth_verify",
            poly1305::onetimeauth_verify(mac, message, key),
        )
        .is_some()
    }

    /// `crypto_onetimeauth_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_onetimeauth_keygen(&self) -> Result<[u8; 32], CompatError> {
        Ok(poly1305::onetimeauth_keygen()?)
    }

    // ========================================================================
    // Public-key box
    // ========================================================================

    /// `crypto_box_keypair`: 64 bytes `secret ‖ public`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_box_keypair(&self) -> Result<Zeroizing<[u8; 64]>, CompatError> {
        Ok(box_::keypair()?.to_bytes())
    }

    /// `crypto_box_seed_keypair`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a seed that is not 32 bytes.
    pub fn crypto_box_seed_keypair(&self, seed: &[u8]) -> Result<Zeroizing<[u8; 64]>, CompatError> {
        Ok(box_::seed_keypair(seed)?.to_bytes())
    }

    /// `crypto_box_keypair_from_secretkey_and_publickey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for keys that are not 32 bytes.
    pub fn crypto_box_keypair_from_secretkey_and_publickey(
        &self,
        secret: &[u8],
        public: &[u8],
    ) -> Result<Zeroizing<[u8; 64]>, CompatError> {
        Ok(box_::keypair_from_secretkey_and_publickey(secret, public)?.to_bytes())
    }

    /// `crypto_box_publickey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a keypair that is not 64 bytes.
    pub fn crypto_box_publickey(&self, keypair: &[u8]) -> Result<[u8; 32], CompatError> {
        Ok(box_::publickey(keypair)?)
    }

    /// `crypto_box_secretkey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a keypair that is not 64 bytes.
    pub fn crypto_box_secretkey(&self, keypair: &[u8]) -> Result<Zeroizing<[u8; 32]>, CompatError> {
        Ok(box_::secretkey(keypair)?)
    }

    /// `crypto_box_publickey_from_secretkey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a secret key that is not 32 bytes.
    pub fn crypto_box_publickey_from_secretkey(&self, secret: &[u8]) -> Result<[u8; 32], CompatError> {
        Ok(box_::publickey_from_secretkey(secret)?)
    }

    /// `crypto_box`: encrypt with `keypair = my_secret ‖ their_public`.
    ///
    /// # Errors
    ///
    /// Returns a length error, or [`CryptoError::InvalidPublicKey`] for a
    /// low-order peer key.
    pub fn crypto_box(
        &self,
        message: &[u8],
        nonce: &[u8],
        keypair: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        let (secret, public) = split_box_keypair(keypair)?;
        Ok(self.backend.box_easy(message, nonce, public, secret)?)
    }

    /// `crypto_box_open` with `keypair = my_secret ‖ their_public`.
    #[must_use]
    pub fn crypto_box_open(&self, ciphertext: &[u8], nonce: &[u8], keypair: &[u8]) -> Option<Vec<u8>> {
        let result = split_box_keypair(keypair).and_then(|(secret, public)| {
            self.backend.box_open_easy(ciphertext, nonce, public, secret)
        });
        sentinel("crypto_box_open", result)
    }

    /// `crypto_box_seal`.
    ///
    /// # Errors
    ///
    /// Returns a length error or [`CryptoError::InvalidPublicKey`].
    pub fn crypto_box_seal(&self, message: &[u8], recipient_pk: &[u8]) -> Result<Vec<u8>, CompatError> {
        Ok(self.backend.box_seal(message, recipient_pk)?)
    }

    /// `crypto_box_seal_open` with the recipient's own 64-byte keypair.
    #[must_use]
    pub fn crypto_box_seal_open(&self, ciphertext: &[u8], keypair: &[u8]) -> Option<Vec<u8>> {
        sentinel(
            "crypto_box_seal_open",
            self.backend.box_seal_open(ciphertext, keypair),
        )
    }

    // ========================================================================
    // Key exchange and scalar multiplication
    // ========================================================================

    /// `crypto_kx` (pre-`kx_*` API).
    ///
    /// # Errors
    ///
    /// Returns a length error or [`CryptoError::InvalidPublicKey`].
    pub fn crypto_kx(
        &self,
        my_secret: &[u8],
        their_public: &[u8],
        client_public: &[u8],
        server_public: &[u8],
    ) -> Result<Zeroizing<[u8; 32]>, CompatError> {
        Ok(kx::kx(my_secret, their_public, client_public, server_public)?)
    }

    /// `crypto_kx_keypair`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_kx_keypair(&self) -> Result<Zeroizing<[u8; 64]>, CompatError> {
        Ok(kx::keypair()?.to_bytes())
    }

    /// `crypto_kx_seed_keypair`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a seed that is not 32 bytes.
    pub fn crypto_kx_seed_keypair(&self, seed: &[u8]) -> Result<Zeroizing<[u8; 64]>, CompatError> {
        Ok(kx::seed_keypair(seed)?.to_bytes())
    }

    /// `crypto_kx_client_session_keys` from the client's 64-byte keypair.
    ///
    /// # Errors
    ///
    /// Returns a length error or [`CryptoError::InvalidPublicKey`].
    pub fn crypto_kx_client_session_keys(
        &self,
        client_keypair: &[u8],
        server_public: &[u8],
    ) -> Result<SessionKeys, CompatError> {
        let (secret, public) = split_box_keypair(client_keypair)?;
        Ok(kx::client_session_keys(public, secret, server_public)?)
    }

    /// `crypto_kx_server_session_keys` from the server's 64-byte keypair.
    ///
    /// # Errors
    ///
    /// Returns a length error or [`CryptoError::InvalidPublicKey`].
    pub fn crypto_kx_server_session_keys(
        &self,
        server_keypair: &[u8],
        client_public: &[u8],
    ) -> Result<SessionKeys, CompatError> {
        let (secret, public) = split_box_keypair(server_keypair)?;
        Ok(kx::server_session_keys(public, secret, client_public)?)
    }

    /// `crypto_scalarmult`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPublicKey`] for an all-zero result.
    pub fn crypto_scalarmult(&self, n: &[u8], p: &[u8]) -> Result<[u8; 32], CompatError> {
        Ok(self.backend.scalarmult(n, p)?)
    }

    /// `crypto_scalarmult_base`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a scalar that is not 32 bytes.
    pub fn crypto_scalarmult_base(&self, n: &[u8]) -> Result<[u8; 32], CompatError> {
        Ok(natrium_crypto::curve25519::scalarmult_base(n)?)
    }

    // ========================================================================
    // Signatures
    // ========================================================================

    /// `crypto_sign_keypair`: 96 bytes `secret(64) ‖ public(32)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_sign_keypair(&self) -> Result<Zeroizing<[u8; 96]>, CompatError> {
        Ok(sign::keypair()?.to_bytes())
    }

    /// `crypto_sign_seed_keypair`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a seed that is not 32 bytes.
    pub fn crypto_sign_seed_keypair(&self, seed: &[u8]) -> Result<Zeroizing<[u8; 96]>, CompatError> {
        Ok(sign::seed_keypair(seed)?.to_bytes())
    }

    /// `crypto_sign_keypair_from_secretkey_and_publickey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for keys of the wrong size.
    pub fn crypto_sign_keypair_from_secretkey_and_publickey(
        &self,
        secret: &[u8],
        public: &[u8],
    ) -> Result<Zeroizing<[u8; 96]>, CompatError> {
        Ok(sign::keypair_from_secretkey_and_publickey(secret, public)?.to_bytes())
    }

    /// `crypto_sign_publickey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a keypair that is not 96 bytes.
    pub fn crypto_sign_publickey(&self, keypair: &[u8]) -> Result<[u8; 32], CompatError> {
        Ok(sign::publickey(keypair)?)
    }

    /// `crypto_sign_secretkey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a keypair that is not 96 bytes.
    pub fn crypto_sign_secretkey(&self, keypair: &[u8]) -> Result<Zeroizing<[u8; 64]>, CompatError> {
        Ok(sign::secretkey(keypair)?)
    }

    /// `crypto_sign_publickey_from_secretkey`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a secret key that is not 64 bytes.
    pub fn crypto_sign_publickey_from_secretkey(&self, secret: &[u8]) -> Result<[u8; 32], CompatError> {
        Ok(sign::publickey_from_secretkey(secret)?)
    }

    /// `crypto_sign_ed25519_sk_to_seed`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a secret key that is not 64 bytes.
    pub fn crypto_sign_ed25519_sk_to_seed(&self, secret: &[u8]) -> Result<Zeroizing<[u8; 32]>, CompatError> {
        Ok(sign::sk_to_seed(secret)?)
    }

    /// `crypto_sign`: signature followed by the message.
    ///
    /// # Errors
    ///
    /// Returns a length error for a secret key that is not 64 bytes.
    pub fn crypto_sign(&self, message: &[u8], secret: &[u8]) -> Result<Vec<u8>, CompatError> {
        let signature = self.backend.sign_detached(message, secret)?;
        let mut signed = Vec::with_capacity(signature.len() + message.len());
        signed.extend_from_slice(&signature);
        signed.extend_from_slice(message);
        Ok(signed)
    }

    /// `crypto_sign_open`: the message if the attached signature verifies.
    #[must_use]
    pub fn crypto_sign_open(&self, signed: &[u8], public: &[u8]) -> Option<Vec<u8>> {
        if signed.len() < sign::SIGNATURE_SIZE {
            tracing::debug!(len = signed.len(), "signed message shorter than a signature");
            return None;
        }
        let (signature, message) = signed.split_at(sign::SIGNATURE_SIZE);
        sentinel(
            "crypto_sign_open",
            self.backend.sign_verify_detached(signature, message, public),
        )
        .map(|()| message.to_vec())
    }

    /// `crypto_sign_detached`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a secret key that is not 64 bytes.
    pub fn crypto_sign_detached(&self, message: &[u8], secret: &[u8]) -> Result<[u8; 64], CompatError> {
        Ok(self.backend.sign_detached(message, secret)?)
    }

    /// `crypto_sign_verify_detached`.
    #[must_use]
    pub fn crypto_sign_verify_detached(&self, signature: &[u8], message: &[u8], public: &[u8]) -> bool {
        sentinel(
            "crypto_sign_verify_detached",
            self.backend.sign_verify_detached(signature, message, public),
        )
        .is_some()
    }

    /// `crypto_sign_ed25519_pk_to_curve25519`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPublicKey`] for keys outside the
    /// prime-order subgroup.
    pub fn crypto_sign_ed25519_pk_to_curve25519(&self, public: &[u8]) -> Result<[u8; 32], CompatError> {
        Ok(sign::pk_to_curve25519(public)?)
    }

    /// `crypto_sign_ed25519_sk_to_curve25519`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a secret key that is not 64 bytes.
    pub fn crypto_sign_ed25519_sk_to_curve25519(
        &self,
        secret: &[u8],
    ) -> Result<Zeroizing<[u8; 32]>, CompatError> {
        Ok(sign::sk_to_curve25519(secret)?)
    }

    // ========================================================================
    // Hashing
    // ========================================================================

    /// `crypto_generichash`.
    ///
    /// # Errors
    ///
    /// Returns a length error for an output outside 1..=64 or a key over 64
    /// bytes.
    pub fn crypto_generichash(
        &self,
        message: &[u8],
        key: &[u8],
        outlen: usize,
    ) -> Result<Vec<u8>, CompatError> {
        Ok(self.backend.generichash(message, key, outlen)?)
    }

    /// `crypto_generichash_init`: an opaque 384-byte context.
    ///
    /// # Errors
    ///
    /// Returns a length error for an output outside 1..=64 or a key over 64
    /// bytes.
    pub fn crypto_generichash_init(
        &self,
        key: &[u8],
        outlen: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CompatError> {
        let state = GenericHashState::new(key, outlen)?;
        Ok(Zeroizing::new(state.to_bytes().to_vec()))
    }

    /// `crypto_generichash_update`: absorb `message` into `ctx` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] if `ctx` is not a context
    /// produced by [`crypto_generichash_init`](Self::crypto_generichash_init).
    pub fn crypto_generichash_update(&self, ctx: &mut [u8], message: &[u8]) -> Result<(), CompatError> {
        let mut state = GenericHashState::from_bytes(ctx)?;
        state.update(message);
        ctx.copy_from_slice(&state.to_bytes()[..]);
        Ok(())
    }

    /// `crypto_generichash_final`: digest of `ctx`, which is wiped.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed context or an `outlen` different
    /// from the one the context was initialised with.
    pub fn crypto_generichash_final(&self, ctx: &mut [u8], outlen: usize) -> Result<Vec<u8>, CompatError> {
        let state = GenericHashState::from_bytes(ctx)?;
        constant_time::memzero(ctx);
        if state.output_len() != outlen {
            return Err(CryptoError::length("digest", state.output_len(), outlen).into());
        }
        Ok(state.finalize())
    }

    /// `crypto_generichash_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_generichash_keygen(&self) -> Result<[u8; 32], CompatError> {
        self.random_key()
    }

    /// `crypto_generichash_blake2b_salt_personal`.
    ///
    /// # Errors
    ///
    /// Returns a length error for bad output, key, salt or personal sizes.
    pub fn crypto_generichash_blake2b_salt_personal(
        &self,
        message: &[u8],
        key: &[u8],
        outlen: usize,
        salt: &[u8],
        personal: &[u8],
    ) -> Result<Vec<u8>, CompatError> {
        Ok(generichash::generichash_salt_personal(
            message, key, outlen, salt, personal,
        )?)
    }

    /// `crypto_shorthash` (SipHash-2-4).
    ///
    /// # Errors
    ///
    /// Returns a length error for a key that is not 16 bytes.
    pub fn crypto_shorthash(&self, message: &[u8], key: &[u8]) -> Result<[u8; 8], CompatError> {
        Ok(shorthash::shorthash(message, key)?)
    }

    /// `crypto_shorthash_siphashx24`.
    ///
    /// # Errors
    ///
    /// Returns a length error for a key that is not 16 bytes.
    pub fn crypto_shorthash_siphashx24(&self, message: &[u8], key: &[u8]) -> Result<[u8; 16], CompatError> {
        Ok(shorthash::shorthash_siphashx24(message, key)?)
    }

    /// `crypto_shorthash_keygen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn crypto_shorthash_keygen(&self) -> Result<[u8; 16], CompatError> {
        Ok(shorthash::keygen()?)
    }

    /// `crypto_pwhash` with a libsodium algorithm identifier.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown algorithm, a bad salt, or limits out
    /// of range.
    pub fn crypto_pwhash(
        &self,
        outlen: usize,
        passwd: &[u8],
        salt: &[u8],
        opslimit: u64,
        memlimit: usize,
        alg: i32,
    ) -> Result<Zeroizing<Vec<u8>>, CompatError> {
        let alg = Algorithm::from_id(alg)?;
        Ok(self
            .backend
            .pwhash(outlen, passwd, salt, opslimit, memlimit, alg)?)
    }

    /// `crypto_pwhash_str` (Argon2id).
    ///
    /// # Errors
    ///
    /// Returns an error for limits out of range.
    pub fn crypto_pwhash_str(
        &self,
        passwd: &[u8],
        opslimit: u64,
        memlimit: usize,
    ) -> Result<String, CompatError> {
        Ok(self
            .backend
            .pwhash_str(passwd, opslimit, memlimit, Algorithm::Argon2id13)?)
    }

    /// `crypto_pwhash_str_verify`, in the legacy argument order.
    #[must_use]
    pub fn crypto_pwhash_str_verify(&self, hash: &str, passwd: &[u8]) -> bool {
        sentinel(
            "crypto_pwhash_str_verify",
            self.backend.pwhash_str_verify(passwd, hash),
        )
        .is_some()
    }

    /// `crypto_pwhash_str_needs_rehash`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] for a malformed string.
    pub fn crypto_pwhash_str_needs_rehash(
        &self,
        hash: &str,
        opslimit: u64,
        memlimit: usize,
    ) -> Result<bool, CompatError> {
        Ok(pwhash::pwhash_str_needs_rehash(hash, opslimit, memlimit)?)
    }

    /// `crypto_pwhash_scryptsalsa208sha256`.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad salt or output length.
    pub fn crypto_pwhash_scryptsalsa208sha256(
        &self,
        outlen: usize,
        passwd: &[u8],
        salt: &[u8],
        opslimit: u64,
        memlimit: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CompatError> {
        Ok(pwhash::pwhash_scryptsalsa208sha256(
            outlen, passwd, salt, opslimit, memlimit,
        )?)
    }

    /// `crypto_pwhash_scryptsalsa208sha256_str`.
    ///
    /// # Errors
    ///
    /// Returns an error if the derivation cannot allocate its table.
    pub fn crypto_pwhash_scryptsalsa208sha256_str(
        &self,
        passwd: &[u8],
        opslimit: u64,
        memlimit: usize,
    ) -> Result<String, CompatError> {
        Ok(pwhash::pwhash_scryptsalsa208sha256_str(
            passwd, opslimit, memlimit,
        )?)
    }

    /// `crypto_pwhash_scryptsalsa208sha256_str_verify`.
    #[must_use]
    pub fn crypto_pwhash_scryptsalsa208sha256_str_verify(&self, hash: &str, passwd: &[u8]) -> bool {
        sentinel(
            "crypto_pwhash_scryptsalsa208sha256_str_verify",
            pwhash::pwhash_scryptsalsa208sha256_str_verify(passwd, hash),
        )
        .is_some()
    }

    /// `crypto_pwhash_scryptsalsa208sha256_str_needs_rehash`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] for a malformed string.
    pub fn crypto_pwhash_scryptsalsa208sha256_str_needs_rehash(
        &self,
        hash: &str,
        opslimit: u64,
        memlimit: usize,
    ) -> Result<bool, CompatError> {
        Ok(pwhash::pwhash_scryptsalsa208sha256_str_needs_rehash(
            hash, opslimit, memlimit,
        )?)
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// `sodium_compare`: -1, 0 or 1, treating inputs as little-endian.
    ///
    /// # Errors
    ///
    /// Returns a length error when the inputs differ in length.
    pub fn sodium_compare(&self, a: &[u8], b: &[u8]) -> Result<i32, CompatError> {
        Ok(constant_time::compare(a, b)?)
    }

    /// `sodium_memcmp`: 0 when equal, -1 otherwise.
    ///
    /// # Errors
    ///
    /// Returns a length error when the inputs differ in length.
    pub fn sodium_memcmp(&self, a: &[u8], b: &[u8]) -> Result<i32, CompatError> {
        Ok(if constant_time::memcmp(a, b)? { 0 } else { -1 })
    }

    /// `sodium_memzero`.
    pub fn sodium_memzero(&self, buf: &mut [u8]) {
        constant_time::memzero(buf);
    }

    /// `sodium_increment`: little-endian increment in place.
    pub fn sodium_increment(&self, n: &mut [u8]) {
        constant_time::increment(n);
    }

    /// `sodium_add`: `a += b` modulo 2^(8·len).
    ///
    /// # Errors
    ///
    /// Returns a length error when the inputs differ in length.
    pub fn sodium_add(&self, a: &mut [u8], b: &[u8]) -> Result<(), CompatError> {
        Ok(constant_time::add(a, b)?)
    }

    /// `sodium_is_zero`.
    #[must_use]
    pub fn sodium_is_zero(&self, n: &[u8]) -> bool {
        constant_time::is_zero(n)
    }

    /// `randombytes_buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn randombytes_buf(&self, len: usize) -> Result<Vec<u8>, CompatError> {
        let mut buf = vec![0u8; len];
        self.backend.fill_random(&mut buf)?;
        Ok(buf)
    }

    /// `randombytes_uniform`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn randombytes_uniform(&self, upper: u32) -> Result<u32, CompatError> {
        Ok(random::uniform(upper)?)
    }

    /// `randombytes_random`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn randombytes_random(&self) -> Result<u32, CompatError> {
        Ok(random::random_u32()?)
    }

    /// `randombytes_random16`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSPRNG fails.
    pub fn randombytes_random16(&self) -> Result<u16, CompatError> {
        Ok(random::random_u16()?)
    }

    /// `sodium_bin2hex`.
    #[must_use]
    pub fn sodium_bin2hex(&self, bin: &[u8]) -> String {
        codec::bin2hex(bin)
    }

    /// `sodium_hex2bin`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] for malformed hex.
    pub fn sodium_hex2bin(&self, hex: &str, ignore: &str) -> Result<Vec<u8>, CompatError> {
        Ok(codec::hex2bin(hex, ignore)?)
    }

    /// `sodium_bin2base64` with a libsodium variant identifier.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown variant.
    pub fn sodium_bin2base64(&self, bin: &[u8], variant: u32) -> Result<String, CompatError> {
        Ok(codec::bin2base64(bin, codec::Base64Variant::from_id(variant)?))
    }

    /// `sodium_base642bin` with a libsodium variant identifier.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown variant or malformed input.
    pub fn sodium_base642bin(&self, b64: &str, variant: u32, ignore: &str) -> Result<Vec<u8>, CompatError> {
        Ok(codec::base642bin(
            b64,
            ignore,
            codec::Base64Variant::from_id(variant)?,
        )?)
    }
}
