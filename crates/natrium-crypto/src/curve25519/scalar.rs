//! Scalars modulo the prime order ℓ of the Ed25519 base point.
//!
//! ℓ = 2^252 + 27742317777372353535851937790883648493.
//!
//! Reduction of wide values runs a fixed sequence of conditional
//! subtractions of shifted copies of ℓ, each selected by a borrow mask, so
//! timing does not depend on the value being reduced.

use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

/// ℓ as little-endian 64-bit words.
const L: [u64; 4] = [
    0x5812_631a_5cf5_d3ed,
    0x14de_f9de_a2f7_9cd6,
    0x0000_0000_0000_0000,
    0x1000_0000_0000_0000,
];

/// Bit length of ℓ.
const L_BITS: usize = 253;

const WIDE_WORDS: usize = 8;

/// A scalar reduced modulo ℓ, stored as 32 little-endian bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub struct Scalar(pub(crate) [u8; 32]);

fn words_from_le(bytes: &[u8]) -> [u64; WIDE_WORDS] {
    let mut words = [0u64; WIDE_WORDS];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks(8)) {
        let mut buf = [0u8; 8];
        buf[..chunk.len()].copy_from_slice(chunk);
        *word = u64::from_le_bytes(buf);
    }
    words
}

/// `L << shift` as a wide value. `shift` is public.
fn shifted_l(shift: usize) -> [u64; WIDE_WORDS] {
    let word_shift = shift / 64;
    let bit_shift = shift % 64;
    let mut out = [0u64; WIDE_WORDS];
    for (i, &limb) in L.iter().enumerate() {
        let lo = i + word_shift;
        if lo < WIDE_WORDS {
            out[lo] |= limb << bit_shift;
        }
        if bit_shift != 0 && lo + 1 < WIDE_WORDS {
            out[lo + 1] |= limb >> (64 - bit_shift);
        }
    }
    out
}

/// Reduce a value below 2^512 modulo ℓ.
fn reduce_wide(mut x: [u64; WIDE_WORDS]) -> [u64; WIDE_WORDS] {
    // x < 2^512 <= ℓ << 260, so subtracting ℓ << i for i = 259..=0 leaves x < ℓ
    for shift in (0..=(WIDE_WORDS * 64 - L_BITS)).rev() {
        let m = shifted_l(shift);
        let mut diff = [0u64; WIDE_WORDS];
        let mut borrow = 0u64;
        for i in 0..WIDE_WORDS {
            let (d1, b1) = x[i].overflowing_sub(m[i]);
            let (d2, b2) = d1.overflowing_sub(borrow);
            diff[i] = d2;
            borrow = u64::from(b1 | b2);
        }
        // keep the difference when there was no final borrow
        let keep = Choice::from((borrow ^ 1) as u8);
        for i in 0..WIDE_WORDS {
            x[i] = u64::conditional_select(&x[i], &diff[i], keep);
        }
        diff.zeroize();
    }
    x
}

fn to_scalar(words: &[u64; WIDE_WORDS]) -> Scalar {
    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_mut(8).zip(words.iter()) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    Scalar(out)
}

impl Scalar {
    /// Zero.
    pub const ZERO: Self = Self([0u8; 32]);

    /// ℓ in little-endian bytes (not itself a reduced scalar).
    pub(crate) const ORDER_BYTES: [u8; 32] = [
        0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde,
        0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x10,
    ];

    /// Reduce a 64-byte little-endian value (a SHA-512 digest) modulo ℓ.
    #[must_use]
    pub fn from_bytes_mod_order_wide(bytes: &[u8; 64]) -> Self {
        let mut words = words_from_le(bytes);
        let reduced = reduce_wide(words);
        words.zeroize();
        to_scalar(&reduced)
    }

    /// Reduce a 32-byte little-endian value modulo ℓ.
    #[must_use]
    pub fn from_bytes_mod_order(bytes: &[u8; 32]) -> Self {
        to_scalar(&reduce_wide(words_from_le(bytes)))
    }

    /// Whether `bytes` is already the canonical encoding of a scalar (< ℓ).
    #[must_use]
    pub fn is_canonical(bytes: &[u8; 32]) -> bool {
        // little-endian comparison against ℓ, most significant byte first
        let mut gt: u16 = 0;
        let mut eq: u16 = 1;
        for (&x, &l) in bytes.iter().zip(Self::ORDER_BYTES.iter()).rev() {
            let (x, l) = (u16::from(x), u16::from(l));
            gt |= (l.wrapping_sub(x) >> 8) & eq;
            eq &= (l ^ x).wrapping_sub(1) >> 8;
        }
        (gt | eq) == 0
    }

    /// `a * b + c mod ℓ`.
    #[must_use]
    pub fn mul_add(a: &Self, b: &Self, c: &Self) -> Self {
        let a = words_from_le(&a.0);
        let b = words_from_le(&b.0);
        let c = words_from_le(&c.0);

        let mut product = [0u64; WIDE_WORDS];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let t = u128::from(a[i]) * u128::from(b[j]) + u128::from(product[i + j]) + carry;
                product[i + j] = t as u64;
                carry = t >> 64;
            }
            product[i + 4] = carry as u64;
        }

        let mut carry = 0u64;
        for i in 0..WIDE_WORDS {
            let (s1, o1) = product[i].overflowing_add(c[i]);
            let (s2, o2) = s1.overflowing_add(carry);
            product[i] = s2;
            carry = u64::from(o1 | o2);
        }

        let reduced = reduce_wide(product);
        product.zeroize();
        to_scalar(&reduced)
    }

    /// Little-endian bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Bit `i` (0 = least significant).
    #[must_use]
    pub(crate) fn bit(bytes: &[u8; 32], i: usize) -> u8 {
        (bytes[i >> 3] >> (i & 7)) & 1
    }
}

/// Clamp a 32-byte secret scalar as X25519 and Ed25519 do.
pub fn clamp(bytes: &mut [u8; 32]) {
    bytes[0] &= 248;
    bytes[31] &= 127;
    bytes[31] |= 64;
}
