//! Constant-time operations.
//!
//! Comparisons and the little-endian nonce helpers run in time
//! that depends only on buffer lengths, never on their contents.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::CryptoError;

/// Constant-time comparison of byte slices.
///
/// Returns `false` for slices of different lengths.
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Timing-safe 16-byte array comparison (Poly1305 tags).
#[must_use]
#[inline(never)]
pub fn verify_16(a: &[u8; 16], b: &[u8; 16]) -> bool {
    ct_eq(a, b)
}

/// Timing-safe 32-byte array comparison.
#[must_use]
#[inline(never)]
pub fn verify_32(a: &[u8; 32], b: &[u8; 32]) -> bool {
    ct_eq(a, b)
}

/// Fold every pair of bytes into a single difference accumulator.
///
/// Nothing short-circuits: the whole iterator is always drained.
fn accumulate_diff<I>(pairs: I) -> u8
where
    I: IntoIterator<Item = (u8, u8)>,
{
    pairs.into_iter().fold(0u8, |acc, (x, y)| acc | (x ^ y))
}

/// `sodium_memcmp`: constant-time equality of two equal-length buffers.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if the lengths differ.
pub fn memcmp(a: &[u8], b: &[u8]) -> Result<bool, CryptoError> {
    if a.len() != b.len() {
        return Err(CryptoError::length("memcmp operand", a.len(), b.len()));
    }
    let diff = accumulate_diff(a.iter().copied().zip(b.iter().copied()));
    Ok(diff.ct_eq(&0).into())
}

/// `sodium_compare`: compare two equal-length buffers as little-endian
/// numbers. Returns -1, 0 or 1.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if the lengths differ.
pub fn compare(a: &[u8], b: &[u8]) -> Result<i32, CryptoError> {
    if a.len() != b.len() {
        return Err(CryptoError::length("compare operand", a.len(), b.len()));
    }

    let mut gt: u16 = 0;
    let mut eq: u16 = 1;
    for (&x, &y) in a.iter().zip(b).rev() {
        let (x, y) = (u16::from(x), u16::from(y));
        gt |= (y.wrapping_sub(x) >> 8) & eq;
        eq &= (y ^ x).wrapping_sub(1) >> 8;
    }
    Ok(i32::from(gt + gt + eq) - 1)
}

/// `sodium_memzero`: wipe a buffer so the compiler cannot elide the writes.
pub fn memzero(buf: &mut [u8]) {
    buf.zeroize();
}

/// `sodium_increment`: add one to a little-endian number in place.
pub fn increment(n: &mut [u8]) {
    let mut c: u16 = 1;
    for byte in n.iter_mut() {
        c += u16::from(*byte);
        *byte = c as u8;
        c >>= 8;
    }
}

/// `sodium_add`: `a += b` over equal-length little-endian numbers,
/// modulo 2^(8 * len).
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if the lengths differ.
pub fn add(a: &mut [u8], b: &[u8]) -> Result<(), CryptoError> {
    if a.len() != b.len() {
        return Err(CryptoError::length("add operand", a.len(), b.len()));
    }
    let mut c: u16 = 0;
    for (x, &y) in a.iter_mut().zip(b) {
        c += u16::from(*x) + u16::from(y);
        *x = c as u8;
        c >>= 8;
    }
    Ok(())
}

/// `sodium_sub`: `a -= b` over equal-length little-endian numbers,
/// modulo 2^(8 * len).
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if the lengths differ.
pub fn sub(a: &mut [u8], b: &[u8]) -> Result<(), CryptoError> {
    if a.len() != b.len() {
        return Err(CryptoError::length("sub operand", a.len(), b.len()));
    }
    let mut borrow: u16 = 0;
    for (x, &y) in a.iter_mut().zip(b) {
        let d = u16::from(*x)
            .wrapping_sub(u16::from(y))
            .wrapping_sub(borrow);
        *x = d as u8;
        borrow = (d >> 8) & 1;
    }
    Ok(())
}

/// `sodium_is_zero`: whether every byte is zero, in constant time.
#[must_use]
pub fn is_zero(n: &[u8]) -> bool {
    let d = n.iter().fold(0u8, |acc, &b| acc | b);
    d.ct_eq(&0).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_ct_eq() {
        assert!(ct_eq(&[1u8; 32], &[1u8; 32]));
        assert!(!ct_eq(&[1u8; 32], &[2u8; 32]));
        assert!(!ct_eq(&[1u8; 32], &[1u8; 16]));
    }

    #[test]
    fn test_verify_fixed() {
        assert!(verify_16(&[0x42; 16], &[0x42; 16]));
        assert!(!verify_16(&[0x42; 16], &[0x43; 16]));
        assert!(verify_32(&[0x42; 32], &[0x42; 32]));
        assert!(!verify_32(&[0x42; 32], &[0x43; 32]));
    }

    #[test]
    fn test_memcmp() {
        assert!(memcmp(b"abcd", b"abcd").unwrap());
        assert!(!memcmp(b"abcd", b"abce").unwrap());
        assert!(memcmp(b"", b"").unwrap());
        assert!(memcmp(b"abc", b"abcd").is_err());
    }

    #[test]
    fn test_memcmp_examines_every_byte() {
        // first byte differs; the accumulator must still see all pairs
        let a = [0u8; 64];
        let mut b = [0u8; 64];
        b[0] = 1;

        let seen = Cell::new(0usize);
        let pairs = a.iter().zip(b.iter()).map(|(&x, &y)| {
            seen.set(seen.get() + 1);
            (x, y)
        });
        assert_ne!(accumulate_diff(pairs), 0);
        assert_eq!(seen.get(), 64);
    }

    #[test]
    fn test_compare_little_endian() {
        assert_eq!(compare(&[1, 2], &[1, 2]).unwrap(), 0);
        // most significant byte is last
        assert_eq!(compare(&[0xff, 1], &[0x00, 2]).unwrap(), -1);
        assert_eq!(compare(&[0x00, 2], &[0xff, 1]).unwrap(), 1);
        assert_eq!(compare(&[2, 1], &[1, 1]).unwrap(), 1);
        assert_eq!(compare(&[], &[]).unwrap(), 0);
        assert!(compare(&[1], &[1, 2]).is_err());
    }

    #[test]
    fn test_memzero() {
        let mut buf = [0xAAu8; 16];
        memzero(&mut buf);
        assert_eq!(buf, [0u8; 16]);
    }

    #[test]
    fn test_increment_carries() {
        let mut n = [0xff, 0xff, 0x00];
        increment(&mut n);
        assert_eq!(n, [0x00, 0x00, 0x01]);

        let mut max = [0xffu8; 4];
        increment(&mut max);
        assert_eq!(max, [0u8; 4]);
    }

    #[test]
    fn test_add_and_sub() {
        let mut a = [0xff, 0x01];
        add(&mut a, &[0x02, 0x00]).unwrap();
        assert_eq!(a, [0x01, 0x02]);

        sub(&mut a, &[0x02, 0x00]).unwrap();
        assert_eq!(a, [0xff, 0x01]);

        let mut z = [0u8; 2];
        sub(&mut z, &[1, 0]).unwrap();
        assert_eq!(z, [0xff, 0xff]);

        assert!(add(&mut a, &[1]).is_err());
    }

    #[test]
    fn test_is_zero() {
        assert!(is_zero(&[0u8; 24]));
        assert!(is_zero(&[]));
        let mut n = [0u8; 24];
        n[23] = 1;
        assert!(!is_zero(&n));
    }
}
