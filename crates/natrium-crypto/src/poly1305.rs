//! Poly1305 one-time authenticator.
//!
//! Arithmetic is carried in five 26-bit limbs so that every product fits in
//! a `u64`. The final reduction modulo 2^130 - 5 selects between `h` and
//! `h - p` with a mask.
//!
//! A Poly1305 key must never authenticate more than one message.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;
use crate::arith::{load32_le, store32_le};
use crate::constant_time::verify_16;
use crate::error::{fixed_array, key_array};
use crate::random::random_32;

/// Poly1305 key size.
pub const KEY_SIZE: usize = 32;

/// Poly1305 tag size.
pub const TAG_SIZE: usize = 16;

const BLOCK_SIZE: usize = 16;
const MASK26: u32 = 0x03ff_ffff;

/// Incremental Poly1305 state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Poly1305 {
    r: [u32; 5],
    h: [u32; 5],
    pad: [u32; 4],
    buffer: [u8; BLOCK_SIZE],
    leftover: usize,
}

impl Poly1305 {
    /// Start a new authenticator. `r` is clamped here.
    #[must_use]
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            r: [
                load32_le(&key[0..]) & 0x03ff_ffff,
                (load32_le(&key[3..]) >> 2) & 0x03ff_ff03,
                (load32_le(&key[6..]) >> 4) & 0x03ff_c0ff,
                (load32_le(&key[9..]) >> 6) & 0x03f0_3fff,
                (load32_le(&key[12..]) >> 8) & 0x000f_ffff,
            ],
            h: [0; 5],
            pad: [
                load32_le(&key[16..]),
                load32_le(&key[20..]),
                load32_le(&key[24..]),
                load32_le(&key[28..]),
            ],
            buffer: [0; BLOCK_SIZE],
            leftover: 0,
        }
    }

    /// Absorb one 16-byte block. `hibit` is 2^128 in limb 4, or 0 for the
    /// padded final block.
    fn block(&mut self, m: &[u8; BLOCK_SIZE], hibit: u32) {
        let [r0, r1, r2, r3, r4] = self.r.map(u64::from);
        let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);

        let h0 = u64::from(self.h[0] + (load32_le(&m[0..]) & MASK26));
        let h1 = u64::from(self.h[1] + ((load32_le(&m[3..]) >> 2) & MASK26));
        let h2 = u64::from(self.h[2] + ((load32_le(&m[6..]) >> 4) & MASK26));
        let h3 = u64::from(self.h[3] + ((load32_le(&m[9..]) >> 6) & MASK26));
        let h4 = u64::from(self.h[4] + ((load32_le(&m[12..]) >> 8) | hibit));

        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let mut d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let mut d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let mut d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let mut d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        let mut c = d0 >> 26;
        self.h[0] = d0 as u32 & MASK26;
        d1 += c;
        c = d1 >> 26;
        self.h[1] = d1 as u32 & MASK26;
        d2 += c;
        c = d2 >> 26;
        self.h[2] = d2 as u32 & MASK26;
        d3 += c;
        c = d3 >> 26;
        self.h[3] = d3 as u32 & MASK26;
        d4 += c;
        c = d4 >> 26;
        self.h[4] = d4 as u32 & MASK26;

        let h0 = u64::from(self.h[0]) + c * 5;
        self.h[0] = h0 as u32 & MASK26;
        self.h[1] += (h0 >> 26) as u32;
    }

    /// Absorb message bytes.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.leftover > 0 {
            let take = (BLOCK_SIZE - self.leftover).min(data.len());
            self.buffer[self.leftover..self.leftover + take].copy_from_slice(&data[..take]);
            self.leftover += take;
            data = &data[take..];
            if self.leftover < BLOCK_SIZE {
                return;
            }
            let block = self.buffer;
            self.block(&block, 1 << 24);
            self.leftover = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for chunk in &mut blocks {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            self.block(&block, 1 << 24);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.leftover = rest.len();
    }

    /// Produce the tag, consuming the state.
    #[must_use]
    pub fn finalize(mut self) -> [u8; TAG_SIZE] {
        if self.leftover > 0 {
            let mut block = [0u8; BLOCK_SIZE];
            block[..self.leftover].copy_from_slice(&self.buffer[..self.leftover]);
            block[self.leftover] = 1;
            self.block(&block, 0);
            block.zeroize();
        }

        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        // full carry
        let mut c = h1 >> 26;
        h1 &= MASK26;
        h2 += c;
        c = h2 >> 26;
        h2 &= MASK26;
        h3 += c;
        c = h3 >> 26;
        h3 &= MASK26;
        h4 += c;
        c = h4 >> 26;
        h4 &= MASK26;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= MASK26;
        h1 += c;

        // g = h + 5 - 2^130
        let mut g0 = h0.wrapping_add(5);
        c = g0 >> 26;
        g0 &= MASK26;
        let mut g1 = h1.wrapping_add(c);
        c = g1 >> 26;
        g1 &= MASK26;
        let mut g2 = h2.wrapping_add(c);
        c = g2 >> 26;
        g2 &= MASK26;
        let mut g3 = h3.wrapping_add(c);
        c = g3 >> 26;
        g3 &= MASK26;
        let mut g4 = h4.wrapping_add(c).wrapping_sub(1 << 26);

        // select h if h < p, else g
        let mask = (g4 >> 31).wrapping_sub(1);
        g0 &= mask;
        g1 &= mask;
        g2 &= mask;
        g3 &= mask;
        g4 &= mask;
        let keep = !mask;
        h0 = (h0 & keep) | g0;
        h1 = (h1 & keep) | g1;
        h2 = (h2 & keep) | g2;
        h3 = (h3 & keep) | g3;
        h4 = (h4 & keep) | g4;

        // h = h % 2^128, then + s
        let w0 = h0 | (h1 << 26);
        let w1 = (h1 >> 6) | (h2 << 20);
        let w2 = (h2 >> 12) | (h3 << 14);
        let w3 = (h3 >> 18) | (h4 << 8);

        let mut tag = [0u8; TAG_SIZE];
        let mut f = u64::from(w0) + u64::from(self.pad[0]);
        store32_le(&mut tag[0..], f as u32);
        f = u64::from(w1) + u64::from(self.pad[1]) + (f >> 32);
        store32_le(&mut tag[4..], f as u32);
        f = u64::from(w2) + u64::from(self.pad[2]) + (f >> 32);
        store32_le(&mut tag[8..], f as u32);
        f = u64::from(w3) + u64::from(self.pad[3]) + (f >> 32);
        store32_le(&mut tag[12..], f as u32);

        tag
    }
}

/// Compute the Poly1305 tag of `message` in one shot.
#[must_use]
pub fn tag(message: &[u8], key: &[u8; KEY_SIZE]) -> [u8; TAG_SIZE] {
    let mut mac = Poly1305::new(key);
    mac.update(message);
    mac.finalize()
}

/// `crypto_onetimeauth`: authenticate `message` under a one-time key.
///
/// # Errors
///
/// Returns an error if `key` is not 32 bytes.
pub fn onetimeauth(message: &[u8], key: &[u8]) -> Result<[u8; TAG_SIZE], CryptoError> {
    let key = key_array::<KEY_SIZE>(key)?;
    Ok(tag(message, key))
}

/// `crypto_onetimeauth_verify`: constant-time tag check.
///
/// # Errors
///
/// Returns an error if `key` is not 32 bytes or `mac` is not 16 bytes, and
/// [`CryptoError::AuthenticationFailed`] if the tag does not match.
pub fn onetimeauth_verify(mac: &[u8], message: &[u8], key: &[u8]) -> Result<(), CryptoError> {
    let mac = fixed_array::<TAG_SIZE>("tag", mac)?;
    let key = key_array::<KEY_SIZE>(key)?;
    if verify_16(mac, &tag(message, key)) {
        Ok(())
    } else {
        Err(CryptoError::AuthenticationFailed)
    }
}

/// Generate a random one-time key.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn onetimeauth_keygen() -> Result<[u8; KEY_SIZE], CryptoError> {
    random_32()
}
