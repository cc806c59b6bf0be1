//! Authenticated encryption with associated data.
//!
//! The slice-based functions mirror libsodium's `crypto_aead_*` family.
//! XChaCha20-Poly1305 IETF takes a 192-bit nonce that is safe to pick at
//! random; the 64- and 96-bit nonce flavours need a counter instead.

pub mod aes256gcm;
pub mod chacha20poly1305;

pub use chacha20poly1305::{
    TAG_SIZE, chacha20poly1305_decrypt, chacha20poly1305_decrypt_detached,
    chacha20poly1305_encrypt, chacha20poly1305_encrypt_detached, chacha20poly1305_ietf_decrypt,
    chacha20poly1305_ietf_decrypt_detached, chacha20poly1305_ietf_encrypt,
    chacha20poly1305_ietf_encrypt_detached, keygen, xchacha20poly1305_ietf_decrypt,
    xchacha20poly1305_ietf_decrypt_detached, xchacha20poly1305_ietf_encrypt,
    xchacha20poly1305_ietf_encrypt_detached,
};

/// XChaCha20-Poly1305 nonce size.
pub const NONCE_SIZE: usize = 24;

/// AEAD key size.
pub const KEY_SIZE: usize = 32;
