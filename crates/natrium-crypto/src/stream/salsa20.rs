//! Salsa20 family: the Salsa20 block function, HSalsa20 and XSalsa20.
//!
//! Salsa20 uses an 8-byte nonce and a 64-bit little-endian block counter.
//! XSalsa20 derives a subkey from the first 16 bytes of a 24-byte nonce
//! with HSalsa20 and runs Salsa20 over the remaining 8 bytes, which makes
//! random nonces safe to use.

use zeroize::{Zeroize, Zeroizing};

use crate::CryptoError;
use crate::arith::{add32, load32_le, rotl32, store32_le, xor_into};
use crate::error::{key_array, nonce_array};

/// Salsa20 key size.
pub const KEY_SIZE: usize = 32;

/// Salsa20 nonce size.
pub const NONCE_SIZE: usize = 8;

/// XSalsa20 nonce size.
pub const XNONCE_SIZE: usize = 24;

/// HSalsa20 input size.
pub const HSALSA20_INPUT_SIZE: usize = 16;

/// Keystream block size.
pub const BLOCK_SIZE: usize = 64;

/// "expand 32-byte k"
const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= rotl32(add32(x[a], x[d]), 7);
    x[c] ^= rotl32(add32(x[b], x[a]), 9);
    x[d] ^= rotl32(add32(x[c], x[b]), 13);
    x[a] ^= rotl32(add32(x[d], x[c]), 18);
}

/// Apply `rounds` Salsa rounds (a multiple of two) to `x` in place.
pub(crate) fn permute(x: &mut [u32; 16], rounds: usize) {
    debug_assert!(rounds % 2 == 0);
    for _ in 0..rounds / 2 {
        // columns
        quarter_round(x, 0, 4, 8, 12);
        quarter_round(x, 5, 9, 13, 1);
        quarter_round(x, 10, 14, 2, 6);
        quarter_round(x, 15, 3, 7, 11);
        // rows
        quarter_round(x, 0, 1, 2, 3);
        quarter_round(x, 5, 6, 7, 4);
        quarter_round(x, 10, 11, 8, 9);
        quarter_round(x, 15, 12, 13, 14);
    }
}

/// Lay out constants, key and the 16-byte input (nonce ‖ counter, or the
/// HSalsa20 input) in the Salsa20 state order.
fn initial_state(key: &[u8; KEY_SIZE], input: &[u8; 16]) -> [u32; 16] {
    [
        SIGMA[0],
        load32_le(&key[0..]),
        load32_le(&key[4..]),
        load32_le(&key[8..]),
        load32_le(&key[12..]),
        SIGMA[1],
        load32_le(&input[0..]),
        load32_le(&input[4..]),
        load32_le(&input[8..]),
        load32_le(&input[12..]),
        SIGMA[2],
        load32_le(&key[16..]),
        load32_le(&key[20..]),
        load32_le(&key[24..]),
        load32_le(&key[28..]),
        SIGMA[3],
    ]
}

/// Salsa20 block function with feed-forward, for the given round count.
fn block(state: &[u32; 16], rounds: usize, out: &mut [u8; BLOCK_SIZE]) {
    let mut x = *state;
    permute(&mut x, rounds);
    for (i, word) in x.iter().enumerate() {
        store32_le(&mut out[i * 4..], add32(*word, state[i]));
    }
    x.zeroize();
}

/// Salsa20/8 core used by scrypt's BlockMix: `b = b + salsa20_8(b)`.
pub(crate) fn salsa20_8_core(b: &mut [u32; 16]) {
    let mut x = *b;
    permute(&mut x, 8);
    for (out, word) in b.iter_mut().zip(x.iter()) {
        *out = add32(*out, *word);
    }
}

/// XOR the Salsa20 keystream starting at block `ic` into `data`.
pub(crate) fn apply_keystream(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ic: u64,
    rounds: usize,
    data: &mut [u8],
) {
    let mut input = [0u8; 16];
    input[..8].copy_from_slice(nonce);
    input[8..].copy_from_slice(&ic.to_le_bytes());
    let mut state = initial_state(key, &input);
    let mut ks = Zeroizing::new([0u8; BLOCK_SIZE]);

    for chunk in data.chunks_mut(BLOCK_SIZE) {
        block(&state, rounds, &mut ks);
        xor_into(chunk, &ks[..]);

        // 64-bit counter in words 8 and 9
        let counter = (u64::from(state[9]) << 32 | u64::from(state[8])).wrapping_add(1);
        state[8] = counter as u32;
        state[9] = (counter >> 32) as u32;
    }
    state.zeroize();
}

/// Derive the XSalsa20 subkey for a 24-byte nonce.
pub(crate) fn xsalsa20_subkey(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; XNONCE_SIZE],
) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut input = [0u8; HSALSA20_INPUT_SIZE];
    input.copy_from_slice(&nonce[..16]);
    Zeroizing::new(hsalsa20_core(key, &input))
}

/// XOR the XSalsa20 keystream starting at block `ic` into `data`.
pub(crate) fn xsalsa20_apply(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; XNONCE_SIZE],
    ic: u64,
    data: &mut [u8],
) {
    let subkey = xsalsa20_subkey(key, nonce);
    let mut tail = [0u8; NONCE_SIZE];
    tail.copy_from_slice(&nonce[16..]);
    apply_keystream(&subkey, &tail, ic, 20, data);
}

fn hsalsa20_core(key: &[u8; KEY_SIZE], input: &[u8; HSALSA20_INPUT_SIZE]) -> [u8; 32] {
    let mut x = initial_state(key, input);
    permute(&mut x, 20);

    let mut out = [0u8; 32];
    for (i, idx) in [0usize, 5, 10, 15, 6, 7, 8, 9].into_iter().enumerate() {
        store32_le(&mut out[i * 4..], x[idx]);
    }
    x.zeroize();
    out
}

/// HSalsa20: derive 32 bytes from a key and a 16-byte input.
///
/// # Errors
///
/// Returns an error if `input` is not 16 bytes or `key` is not 32 bytes.
pub fn hsalsa20(input: &[u8], key: &[u8]) -> Result<[u8; 32], CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let input = nonce_array::<HSALSA20_INPUT_SIZE>(input)?;
    Ok(hsalsa20_core(key, input))
}

/// Salsa20 keystream of `len` bytes.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn salsa20(len: usize, nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    salsa20_xor_ic(&vec![0u8; len], nonce, 0, key)
}

/// Encrypt or decrypt `message` with Salsa20.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn salsa20_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    salsa20_xor_ic(message, nonce, 0, key)
}

/// Encrypt or decrypt `message` with Salsa20, starting at block `ic`.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn salsa20_xor_ic(
    message: &[u8],
    nonce: &[u8],
    ic: u64,
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let nonce = nonce_array::<NONCE_SIZE>(nonce)?;
    let mut out = message.to_vec();
    apply_keystream(key, nonce, ic, 20, &mut out);
    Ok(out)
}

/// Encrypt or decrypt `message` with the reduced-round Salsa20/12.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn salsa2012_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    reduced_xor(message, nonce, key, 12)
}

/// Encrypt or decrypt `message` with the reduced-round Salsa20/8.
///
/// # Errors
///
/// Returns an error if the nonce is not 8 bytes or the key is not 32 bytes.
pub fn salsa208_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    reduced_xor(message, nonce, key, 8)
}

fn reduced_xor(
    message: &[u8],
    nonce: &[u8],
    key: &[u8],
    rounds: usize,
) -> Result<Vec<u8>, CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let nonce = nonce_array::<NONCE_SIZE>(nonce)?;
    let mut out = message.to_vec();
    apply_keystream(key, nonce, 0, rounds, &mut out);
    Ok(out)
}

/// XSalsa20 keystream of `len` bytes.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn xsalsa20(len: usize, nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xsalsa20_xor_ic(&vec![0u8; len], nonce, 0, key)
}

/// Encrypt or decrypt `message` with XSalsa20.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn xsalsa20_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xsalsa20_xor_ic(message, nonce, 0, key)
}

/// Encrypt or decrypt `message` with XSalsa20, starting at block `ic`.
///
/// # Errors
///
/// Returns an error if the nonce is not 24 bytes or the key is not 32 bytes.
pub fn xsalsa20_xor_ic(
    message: &[u8],
    nonce: &[u8],
    ic: u64,
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    let nonce = nonce_array::<XNONCE_SIZE>(nonce)?;
    let mut out = message.to_vec();
    xsalsa20_apply(key, nonce, ic, &mut out);
    Ok(out)
}
