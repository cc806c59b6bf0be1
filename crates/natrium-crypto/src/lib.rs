//! # Natrium Crypto
//!
//! Pure-Rust implementations of the libsodium primitive set, producing
//! byte-for-byte the same output as libsodium for the same inputs.
//!
//! This crate provides:
//! - Salsa20 / XSalsa20 / ChaCha20 / XChaCha20 stream ciphers
//! - Poly1305 one-time authentication
//! - `secretbox` and the ChaCha20-Poly1305 AEAD family
//! - X25519 boxes, sealed boxes and key exchange
//! - Ed25519 signatures and Ed25519 → Curve25519 key conversion
//! - BLAKE2b, SipHash-2-4, Argon2 and legacy scrypt password hashing
//! - Constant-time comparison, nonce arithmetic, codecs and randomness
//!
//! ## Cryptographic Suite
//!
//! | Function | Algorithm | Key / Nonce |
//! |----------|-----------|-------------|
//! | Secret-key box | XSalsa20-Poly1305 | 32 / 24 bytes |
//! | AEAD | ChaCha20-Poly1305 (original, IETF), XChaCha20-Poly1305 | 32 / 8, 12, 24 bytes |
//! | Public-key box | X25519 + XSalsa20-Poly1305 | 32 / 24 bytes |
//! | Signatures | Ed25519 | 64-byte secret, 32-byte public |
//! | Key exchange | X25519 + BLAKE2b-512 | 32 bytes |
//! | Generic hash | BLAKE2b | 0–64 byte key, 1–64 byte output |
//! | Short hash | SipHash-2-4 | 16 bytes |
//! | Password hash | Argon2id / Argon2i v1.3, scrypt | 16 / 32-byte salt |
//!
//! Every fallible operation returns [`CryptoError`]. Authentication and
//! signature failures are ordinary errors, never panics.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

mod arith;

pub mod aead;
pub mod box_;
pub mod codec;
pub mod constant_time;
pub mod curve25519;
pub mod error;
pub mod generichash;
pub mod kx;
pub mod poly1305;
pub mod pwhash;
pub mod random;
pub mod secretbox;
pub mod shorthash;
pub mod sign;
pub mod stream;

pub use error::CryptoError;

/// XSalsa20-Poly1305 `secretbox` key size
pub const SECRETBOX_KEY_SIZE: usize = 32;

/// XSalsa20-Poly1305 `secretbox` nonce size
pub const SECRETBOX_NONCE_SIZE: usize = 24;

/// Poly1305 tag size
pub const MAC_SIZE: usize = 16;

/// X25519 public key size
pub const X25519_PUBLIC_KEY_SIZE: usize = 32;

/// X25519 secret key size
pub const X25519_SECRET_KEY_SIZE: usize = 32;

/// Ed25519 public key size
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 secret key size (seed ‖ public key)
pub const ED25519_SECRET_KEY_SIZE: usize = 64;

/// Ed25519 signature size
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// Default BLAKE2b output size
pub const GENERICHASH_BYTES: usize = 32;
