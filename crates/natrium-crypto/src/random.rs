//! Secure random number generation.
//!
//! All randomness comes from the operating system CSPRNG, except
//! [`buf_deterministic`], which expands a caller-supplied seed.

use crate::CryptoError;
use crate::error::fixed_array;
use crate::stream::ChaCha20;

/// Seed size for [`buf_deterministic`].
pub const SEED_SIZE: usize = 32;

/// Fill a buffer with random bytes from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the underlying OS CSPRNG fails.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::fill(buf).map_err(|_| CryptoError::RandomFailed)
}

/// `randombytes_buf`: `len` random bytes.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the underlying OS CSPRNG fails.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; len];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Generate a random 32-byte array.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the underlying OS CSPRNG fails.
pub fn random_32() -> Result<[u8; 32], CryptoError> {
    let mut buf = [0u8; 32];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Generate a random 24-byte array, the size of an extended nonce.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the underlying OS CSPRNG fails.
pub fn random_24() -> Result<[u8; 24], CryptoError> {
    let mut buf = [0u8; 24];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// `randombytes_random`: a uniformly random `u32`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the underlying OS CSPRNG fails.
pub fn random_u32() -> Result<u32, CryptoError> {
    let mut buf = [0u8; 4];
    fill_random(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// `randombytes_random16`: a uniformly random `u16`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the underlying OS CSPRNG fails.
pub fn random_u16() -> Result<u16, CryptoError> {
    let mut buf = [0u8; 2];
    fill_random(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// `randombytes_uniform`: a uniform value in `0..upper`, without modulo
/// bias. Returns 0 when `upper < 2`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the underlying OS CSPRNG fails.
pub fn uniform(upper: u32) -> Result<u32, CryptoError> {
    uniform_with(upper, random_u32)
}

/// Rejection sampling over 32-bit draws: values below
/// `2^32 mod upper` are discarded.
fn uniform_with<F>(upper: u32, mut draw: F) -> Result<u32, CryptoError>
where
    F: FnMut() -> Result<u32, CryptoError>,
{
    if upper < 2 {
        return Ok(0);
    }
    let min = upper.wrapping_neg() % upper;
    loop {
        let r = draw()?;
        if r >= min {
            return Ok(r % upper);
        }
    }
}

/// `randombytes_buf_deterministic`: expand a 32-byte seed into `len`
/// bytes with IETF ChaCha20 under the nonce `"LibsodiumDRG"`.
///
/// # Errors
///
/// Returns an error if `seed` is not 32 bytes, or if `len` exceeds the
/// 256 GiB IETF keystream.
pub fn buf_deterministic(len: usize, seed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let seed = fixed_array::<SEED_SIZE>("seed", seed)?;
    let mut out = vec![0u8; len];
    ChaCha20::new_ietf(seed, b"LibsodiumDRG", 0).apply_keystream(&mut out)?;
    Ok(out)
}
