//! SipHash-2-4 short-input hashing (`crypto_shorthash`).
//!
//! Fast keyed hashing for hash tables and similar uses where collisions must
//! be hard to force. Not a general-purpose MAC or collision-resistant hash.

use zeroize::Zeroize;

use crate::CryptoError;
use crate::arith::{add64, load64_le, rotl64};
use crate::error::key_array;
use crate::random::fill_random;

/// Key size.
pub const KEY_SIZE: usize = 16;

/// `shorthash` output size.
pub const BYTES: usize = 8;

/// `shorthash_siphashx24` output size.
pub const BYTES_X: usize = 16;

#[derive(Zeroize)]
struct SipState {
    v: [u64; 4],
}

impl SipState {
    fn new(key: &[u8; KEY_SIZE], wide: bool) -> Self {
        let k0 = load64_le(&key[0..]);
        let k1 = load64_le(&key[8..]);
        let mut v = [
            k0 ^ 0x736f_6d65_7073_6575,
            k1 ^ 0x646f_7261_6e64_6f6d,
            k0 ^ 0x6c79_6765_6e65_7261,
            k1 ^ 0x7465_6462_7974_6573,
        ];
        if wide {
            v[1] ^= 0xee;
        }
        Self { v }
    }

    #[inline(always)]
    fn round(&mut self) {
        let v = &mut self.v;
        v[0] = add64(v[0], v[1]);
        v[1] = rotl64(v[1], 13);
        v[1] ^= v[0];
        v[0] = rotl64(v[0], 32);
        v[2] = add64(v[2], v[3]);
        v[3] = rotl64(v[3], 16);
        v[3] ^= v[2];
        v[0] = add64(v[0], v[3]);
        v[3] = rotl64(v[3], 21);
        v[3] ^= v[0];
        v[2] = add64(v[2], v[1]);
        v[1] = rotl64(v[1], 17);
        v[1] ^= v[2];
        v[2] = rotl64(v[2], 32);
    }

    fn absorb(&mut self, word: u64) {
        self.v[3] ^= word;
        self.round();
        self.round();
        self.v[0] ^= word;
    }

    fn absorb_message(&mut self, message: &[u8]) {
        let mut chunks = message.chunks_exact(8);
        for chunk in &mut chunks {
            self.absorb(load64_le(chunk));
        }
        let rest = chunks.remainder();
        let mut last = [0u8; 8];
        last[..rest.len()].copy_from_slice(rest);
        last[7] = message.len() as u8;
        self.absorb(u64::from_le_bytes(last));
    }

    fn squeeze(&mut self, marker: u64) -> u64 {
        self.v[2] ^= marker;
        for _ in 0..4 {
            self.round();
        }
        self.v[0] ^ self.v[1] ^ self.v[2] ^ self.v[3]
    }
}

/// SipHash-2-4 with a 64-bit output.
#[must_use]
pub fn siphash24(message: &[u8], key: &[u8; KEY_SIZE]) -> [u8; BYTES] {
    let mut state = SipState::new(key, false);
    state.absorb_message(message);
    let out = state.squeeze(0xff).to_le_bytes();
    state.zeroize();
    out
}

/// SipHash-2-4 with a 128-bit output.
#[must_use]
pub fn siphashx24(message: &[u8], key: &[u8; KEY_SIZE]) -> [u8; BYTES_X] {
    let mut state = SipState::new(key, true);
    state.absorb_message(message);

    let mut out = [0u8; BYTES_X];
    out[..8].copy_from_slice(&state.squeeze(0xee).to_le_bytes());
    state.v[1] ^= 0xdd;
    out[8..].copy_from_slice(&state.squeeze(0).to_le_bytes());
    state.zeroize();
    out
}

/// `crypto_shorthash`: 8-byte SipHash-2-4 of `message`.
///
/// # Errors
///
/// Returns an error if `key` is not 16 bytes.
pub fn shorthash(message: &[u8], key: &[u8]) -> Result<[u8; BYTES], CryptoError> {
    Ok(siphash24(message, key_array(key)?))
}

/// `crypto_shorthash_siphashx24`: 16-byte SipHash-2-4 of `message`.
///
/// # Errors
///
/// Returns an error if `key` is not 16 bytes.
pub fn shorthash_siphashx24(message: &[u8], key: &[u8]) -> Result<[u8; BYTES_X], CryptoError> {
    Ok(siphashx24(message, key_array(key)?))
}

/// Generate a random short-hash key.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn keygen() -> Result<[u8; KEY_SIZE], CryptoError> {
    let mut key = [0u8; KEY_SIZE];
    fill_random(&mut key)?;
    Ok(key)
}
