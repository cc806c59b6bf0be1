//! ChaCha20 family: original, IETF, HChaCha20 and XChaCha20.
//!
//! | Variant | Nonce | Counter |
//! |---------|-------|---------|
//! | original | 8 bytes | 64-bit |
//! | IETF (RFC 8439) | 12 bytes | 32-bit |
//! | XChaCha20 | 24 bytes | 64-bit, over an HChaCha20 subkey |
//!
//! The IETF variant refuses to wrap its 32-bit counter and reports
//! [`CryptoError::MessageTooLong`] instead.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::CryptoError;
use crate::arith::{add32, load32_le, rotl32, store32_le, xor_into};
use crate::error::{key_array, nonce_array};

/// ChaCha20 key size.
pub const KEY_SIZE: usize = 32;

/// Original ChaCha20 nonce size.
pub const NONCE_SIZE: usize = 8;

/// IETF ChaCha20 nonce size.
pub const IETF_NONCE_SIZE: usize = 12;

/// XChaCha20 nonce size.
pub const XNONCE_SIZE: usize = 24;

/// HChaCha20 input size.
pub const HCHACHA20_INPUT_SIZE: usize = 16;

/// Keystream block size.
pub const BLOCK_SIZE: usize = 64;

const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[a] = add32(x[a], x[b]);
    x[d] = rotl32(x[d] ^ x[a], 16);
    x[c] = add32(x[c], x[d]);
    x[b] = rotl32(x[b] ^ x[c], 12);
    x[a] = add32(x[a], x[b]);
    x[d] = rotl32(x[d] ^ x[a], 8);
    x[c] = add32(x[c], x[d]);
    x[b] = rotl32(x[b] ^ x[c], 7);
}

fn permute(x: &mut [u32; 16]) {
    for _ in 0..10 {
        quarter_round(x, 0, 4, 8, 12);
        quarter_round(x, 1, 5, 9, 13);
        quarter_round(x, 2, 6, 10, 14);
        quarter_round(x, 3, 7, 11, 15);

        quarter_round(x, 0, 5, 10, 15);
        quarter_round(x, 1, 6, 11, 12);
        quarter_round(x, 2, 7, 8, 13);
        quarter_round(x, 3, 4, 9, 14);
    }
}

fn initial_state(key: &[u8; KEY_SIZE], tail: &[u8; 16]) -> [u32; 16] {
    let mut state = [0u32; 16];
    state[..4].copy_from_slice(&SIGMA);
    for i in 0..8 {
        state[4 + i] = load32_le(&key[i * 4..]);
    }
    for i in 0..4 {
        state[12 + i] = load32_le(&tail[i * 4..]);
    }
    state
}

/// Width of the block counter, which also fixes the nonce layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterWidth {
    /// Words 12-13 hold the counter, 14-15 the nonce.
    Bits64,
    /// Word 12 holds the counter, 13-15 the nonce.
    Bits32,
}

/// Incremental ChaCha20 keystream.
///
/// Keystream is consumed in whole blocks: each call to
/// [`apply_keystream`](Self::apply_keystream) starts at a fresh block, so
/// splitting a message is only transparent on 64-byte boundaries.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ChaCha20 {
    state: [u32; 16],
    #[zeroize(skip)]
    width: CounterWidth,
    #[zeroize(skip)]
    exhausted: bool,
}

impl ChaCha20 {
    /// Original ChaCha20 with an 8-byte nonce and 64-bit counter `ic`.
    #[must_use]
    pub fn new(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], ic: u64) -> Self {
        let mut tail = [0u8; 16];
        tail[..8].copy_from_slice(&ic.to_le_bytes());
        tail[8..].copy_from_slice(nonce);
        Self {
            state: initial_state(key, &tail),
            width: CounterWidth::Bits64,
            exhausted: false,
        }
    }

    /// IETF ChaCha20 with a 12-byte nonce and 32-bit counter `ic`.
    #[must_use]
    pub fn new_ietf(key: &[u8; KEY_SIZE], nonce: &[u8; IETF_NONCE_SIZE], ic: u32) -> Self {
        let mut tail = [0u8; 16];
        tail[..4].copy_from_slice(&ic.to_le_bytes());
        tail[4..].copy_from_slice(nonce);
        Self {
            state: initial_state(key, &tail),
            width: CounterWidth::Bits32,
            exhausted: false,
        }
    }

    /// XChaCha20: HChaCha20 subkey over the first 16 nonce bytes, then
    /// original ChaCha20 with the last 8.
    #[must_use]
    pub fn new_x(key: &[u8; KEY_SIZE], nonce: &[u8; XNONCE_SIZE], ic: u64) -> Self {
        let subkey = xchacha20_subkey(key, nonce);
        let mut tail = [0u8; NONCE_SIZE];
        tail.copy_from_slice(&nonce[16..]);
        Self::new(&subkey, &tail, ic)
    }

    /// Blocks left before the counter would wrap. `None` means unbounded.
    fn remaining_blocks(&self) -> Option<u64> {
        match self.width {
            CounterWidth::Bits64 => None,
            CounterWidth::Bits32 if self.exhausted => Some(0),
            CounterWidth::Bits32 => Some((1u64 << 32) - u64::from(self.state[12])),
        }
    }

    fn increment(&mut self) {
        match self.width {
            CounterWidth::Bits64 => {
                let counter = ((u64::from(self.state[13]) << 32) | u64::from(self.state[12]))
                    .wrapping_add(1);
                self.state[12] = counter as u32;
                self.state[13] = (counter >> 32) as u32;
            }
            CounterWidth::Bits32 => {
                let (next, wrapped) = self.state[12].overflowing_add(1);
                self.state[12] = next;
                self.exhausted |= wrapped;
            }
        }
    }

    /// Produce the next keystream block and advance the counter.
    pub fn next_block(&mut self, out: &mut [u8; BLOCK_SIZE]) {
        let mut x = self.state;
        permute(&mut x);
        for (i, word) in x.iter().enumerate() {
            store32_le(&mut out[i * 4..], add32(*word, self.state[i]));
        }
        x.zeroize();
        self.increment();
    }

    /// XOR keystream into `data` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MessageTooLong`] if an IETF instance would need
    /// to wrap its 32-bit counter. `data` is left untouched in that case.
    pub fn apply_keystream(&mut self, data: &mut [u8]) -> Result<(), CryptoError> {
        let blocks = data.len().div_ceil(BLOCK_SIZE) as u64;
        if let Some(remaining) = self.remaining_blocks() {
            if blocks > remaining {
                return Err(CryptoError::MessageTooLong);
            }
        }

        let mut ks = Zeroizing::new([0u8; BLOCK_SIZE]);
        for chunk in data.chunks_mut(BLOCK_SIZE) {
            self.next_block(&mut ks);
            xor_into(chunk, &ks[..]);
        }
        Ok(())
    }
}

fn hchacha20_core(key: &[u8; KEY_SIZE], input: &[u8; HCHACHA20_INPUT_SIZE]) -> [u8; 32] {
    let mut x = initial_state(key, input);
    permute(&mut x);

    let mut out = [0u8; 32];
    for (i, idx) in [0usize, 1, 2, 3, 12, 13, 14, 15].into_iter().enumerate() {
        store32_le(&mut out[i * 4..], x[idx]);
    }
    x.zeroize();
    out
}

pub(crate) fn xchacha20_subkey(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; XNONCE_SIZE],
) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut input = [0u8; HCHACHA20_INPUT_SIZE];
    input.copy_from_slice(&nonce[..16]);
    Zeroizing::new(hchacha20_core(key, &input))
}

/// HChaCha20: derive 32 bytes from a key and a 16-byte input.
///
/// # Errors
///
/// Returns an error if `input` is not 16 bytes or `key` is not 32 bytes.
pub fn hchacha20(input: &[u8], key: &[u8]) -> Result<[u8; 32], CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let input = nonce_array::<HCHACHA20_INPUT_SIZE>(input)?;
    Ok(hchacha20_core(key, input))
}

/// Original ChaCha20 keystream of `len` bytes.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn chacha20(len: usize, nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    chacha20_xor_ic(&vec![0u8; len], nonce, 0, key)
}

/// Encrypt or decrypt with original ChaCha20 starting at block `ic`.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn chacha20_xor_ic(
    message: &[u8],
    nonce: &[u8],
    ic: u64,
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let nonce = nonce_array::<NONCE_SIZE>(nonce)?;
    let mut out = message.to_vec();
    ChaCha20::new(key, nonce, ic).apply_keystream(&mut out)?;
    Ok(out)
}

/// Encrypt or decrypt with original ChaCha20.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn chacha20_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    chacha20_xor_ic(message, nonce, 0, key)
}

/// IETF ChaCha20 keystream of `len` bytes.
///
/// # Errors
///
/// Returns an error on bad key or nonce lengths, or if `len` exceeds
/// 256 GiB.
pub fn chacha20_ietf(len: usize, nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    chacha20_ietf_xor_ic(&vec![0u8; len], nonce, 0, key)
}

/// Encrypt or decrypt with IETF ChaCha20 starting at block `ic`.
///
/// # Errors
///
/// Returns an error on bad key or nonce lengths, or
/// [`CryptoError::MessageTooLong`] if the 32-bit counter would wrap.
pub fn chacha20_ietf_xor_ic(
    message: &[u8],
    nonce: &[u8],
    ic: u32,
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let nonce = nonce_array::<IETF_NONCE_SIZE>(nonce)?;
    let mut out = message.to_vec();
    ChaCha20::new_ietf(key, nonce, ic).apply_keystream(&mut out)?;
    Ok(out)
}

/// Encrypt or decrypt with IETF ChaCha20.
///
/// # Errors
///
/// See [`chacha20_ietf_xor_ic`].
pub fn chacha20_ietf_xor(
    message: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    chacha20_ietf_xor_ic(message, nonce, 0, key)
}

/// XChaCha20 keystream of `len` bytes.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn xchacha20(len: usize, nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xchacha20_xor_ic(&vec![0u8; len], nonce, 0, key)
}

/// Encrypt or decrypt with XChaCha20 starting at block `ic`.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn xchacha20_xor_ic(
    message: &[u8],
    nonce: &[u8],
    ic: u64,
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let nonce = nonce_array::<XNONCE_SIZE>(nonce)?;
    let mut out = message.to_vec();
    ChaCha20::new_x(key, nonce, ic).apply_keystream(&mut out)?;
    Ok(out)
}

/// Encrypt or decrypt with XChaCha20.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn xchacha20_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xchacha20_xor_ic(message, nonce, 0, key)
}
