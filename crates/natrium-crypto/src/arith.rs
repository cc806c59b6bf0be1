//! Fixed-width word arithmetic and little-endian byte-order helpers.
//!
//! Every ARX primitive in the crate is written against these helpers so that
//! wrap-around is explicit at each addition and rotation. Loads read the
//! first 4 or 8 bytes of the given slice; stores write the first 4 or 8.

/// 32-bit addition modulo 2^32.
#[inline(always)]
#[must_use]
pub const fn add32(a: u32, b: u32) -> u32 {
    a.wrapping_add(b)
}

/// 64-bit addition modulo 2^64.
#[inline(always)]
#[must_use]
pub const fn add64(a: u64, b: u64) -> u64 {
    a.wrapping_add(b)
}

/// 32-bit left rotation.
#[inline(always)]
#[must_use]
pub const fn rotl32(x: u32, n: u32) -> u32 {
    x.rotate_left(n)
}

/// 64-bit left rotation.
#[inline(always)]
#[must_use]
pub const fn rotl64(x: u64, n: u32) -> u64 {
    x.rotate_left(n)
}

/// 64-bit right rotation.
#[inline(always)]
#[must_use]
pub const fn rotr64(x: u64, n: u32) -> u64 {
    x.rotate_right(n)
}

/// Load a little-endian u32.
#[inline(always)]
#[must_use]
pub fn load32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Store a u32 little-endian.
#[inline(always)]
pub fn store32_le(out: &mut [u8], x: u32) {
    out[..4].copy_from_slice(&x.to_le_bytes());
}

/// Load a little-endian u64.
#[inline(always)]
#[must_use]
pub fn load64_le(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Store a u64 little-endian.
#[inline(always)]
pub fn store64_le(out: &mut [u8], x: u64) {
    out[..8].copy_from_slice(&x.to_le_bytes());
}

/// XOR `src` into `dst` over the length of the shorter slice.
#[inline]
pub fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps() {
        assert_eq!(add32(u32::MAX, 1), 0);
        assert_eq!(add32(0x8000_0000, 0x8000_0001), 1);
        assert_eq!(add64(u64::MAX, 2), 1);
    }

    #[test]
    fn test_rotations() {
        assert_eq!(rotl32(0x8000_0001, 1), 0x0000_0003);
        assert_eq!(rotl64(1, 63), 0x8000_0000_0000_0000);
        assert_eq!(rotr64(1, 1), 0x8000_0000_0000_0000);
        assert_eq!(rotl32(0x1234_5678, 0), 0x1234_5678);
    }

    #[test]
    fn test_load_store_le() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(load32_le(&bytes), 0x0403_0201);
        assert_eq!(load64_le(&bytes), 0x0807_0605_0403_0201);

        let mut out = [0u8; 8];
        store64_le(&mut out, 0x0807_0605_0403_0201);
        assert_eq!(out, bytes);
        store32_le(&mut out, 0xAABB_CCDD);
        assert_eq!(&out[..4], &[0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn test_xor_into_shorter_source() {
        let mut dst = [0xFFu8; 4];
        xor_into(&mut dst, &[0x0F, 0xF0]);
        assert_eq!(dst, [0xF0, 0x0F, 0xFF, 0xFF]);
    }
}
