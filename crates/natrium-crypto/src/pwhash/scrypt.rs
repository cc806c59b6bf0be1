//! Legacy scrypt password hashing (`crypto_pwhash_scryptsalsa208sha256`).
//!
//! scrypt (RFC 7914) is built from PBKDF2-HMAC-SHA-256 and the Salsa20/8
//! core of the stream engine. Encoded strings use the `$7$` format:
//!
//! ```text
//! $7$ N r(5) p(5) salt(43) $ hash(43)
//! ```
//!
//! where every field is written with the crypt(3) base-64 alphabet, least
//! significant digit first. The salt field's ASCII characters, not the raw
//! salt bytes, are the scrypt salt.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::CryptoError;
use crate::constant_time::ct_eq;
use crate::error::fixed_array;
use crate::random::fill_random;
use crate::stream::salsa20::salsa20_8_core;

/// Raw salt size.
pub const SALT_BYTES: usize = 32;

/// Encoded string size including libsodium's terminating NUL.
pub const STR_BYTES: usize = 102;

/// Prefix of encoded strings.
pub const STR_PREFIX: &str = "$7$";

/// Minimum derived key length.
pub const BYTES_MIN: usize = 16;

/// Lowest opslimit; smaller values are raised to this.
pub const OPSLIMIT_MIN: u64 = 32_768;

/// Lowest recommended memlimit.
pub const MEMLIMIT_MIN: usize = 16_777_216;

/// Interactive opslimit.
pub const OPSLIMIT_INTERACTIVE: u64 = 524_288;

/// Interactive memlimit (16 MiB).
pub const MEMLIMIT_INTERACTIVE: usize = 16_777_216;

/// Sensitive opslimit.
pub const OPSLIMIT_SENSITIVE: u64 = 33_554_432;

/// Sensitive memlimit (1 GiB).
pub const MEMLIMIT_SENSITIVE: usize = 1_073_741_824;

const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encoded hash length (32 bytes in 6-bit digits).
const HASH_CHARS: usize = 43;

/// scrypt cost parameters: `N = 2^n_log2`, block size `r`, parallelism `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    /// log2 of the CPU/memory cost N.
    pub n_log2: u32,
    /// Block size.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
}

impl ScryptParams {
    /// libsodium's mapping from `(opslimit, memlimit)` to scrypt costs.
    #[must_use]
    pub fn pick(opslimit: u64, memlimit: usize) -> Self {
        let opslimit = opslimit.max(OPSLIMIT_MIN);
        if memlimit < MEMLIMIT_MIN {
            tracing::warn!(memlimit, "scrypt memlimit below the recommended minimum");
        }
        let r: u32 = 8;
        let memlimit = memlimit as u64;

        let (n_log2, p) = if opslimit < memlimit / 32 {
            let max_n = opslimit / (u64::from(r) * 4);
            (n_log2_for(max_n), 1)
        } else {
            let max_n = memlimit / (u64::from(r) * 128);
            let n_log2 = n_log2_for(max_n);
            let max_rp = ((opslimit / 4) >> n_log2).min(0x3fff_ffff);
            (n_log2, (max_rp as u32) / r)
        };
        Self { n_log2, r, p }
    }

    fn validate(&self) -> Result<(), CryptoError> {
        if self.n_log2 == 0 || self.n_log2 > 63 || self.r == 0 || self.p == 0 {
            return Err(CryptoError::InvalidParameter(format!("scrypt params {self:?}")));
        }
        if u64::from(self.r) * u64::from(self.p) >= 1 << 30 {
            return Err(CryptoError::InvalidParameter("scrypt r * p too large".into()));
        }
        Ok(())
    }
}

/// Smallest `n` in `1..63` with `2^n > max_n / 2`.
fn n_log2_for(max_n: u64) -> u32 {
    let mut n_log2 = 1;
    while n_log2 < 63 {
        if (1u64 << n_log2) > max_n / 2 {
            break;
        }
        n_log2 += 1;
    }
    n_log2
}

/// PBKDF2-HMAC-SHA-256 with one iteration, which is all scrypt needs.
fn pbkdf2_sha256(password: &[u8], salt: &[u8], out: &mut [u8]) -> Result<(), CryptoError> {
    let prf = Hmac::<Sha256>::new_from_slice(password)
        .map_err(|_| CryptoError::InvalidParameter("HMAC key".into()))?;
    for (i, chunk) in out.chunks_mut(32).enumerate() {
        let index = u32::try_from(i + 1)
            .map_err(|_| CryptoError::InvalidParameter("PBKDF2 output too long".into()))?;
        let mut mac = prf.clone();
        mac.update(salt);
        mac.update(&index.to_be_bytes());
        let block = mac.finalize().into_bytes();
        chunk.copy_from_slice(&block[..chunk.len()]);
    }
    Ok(())
}

/// scrypt BlockMix over `2r` 64-byte blocks held as words.
fn block_mix(input: &[u32], output: &mut [u32], r: usize) {
    let mut x = [0u32; 16];
    x.copy_from_slice(&input[(2 * r - 1) * 16..]);
    for i in 0..2 * r {
        for (w, b) in x.iter_mut().zip(&input[i * 16..(i + 1) * 16]) {
            *w ^= b;
        }
        salsa20_8_core(&mut x);
        // even blocks to the first half, odd blocks to the second
        let dst = (i / 2 + (i & 1) * r) * 16;
        output[dst..dst + 16].copy_from_slice(&x);
    }
    x.zeroize();
}

fn integerify(x: &[u32], r: usize) -> u64 {
    let j = (2 * r - 1) * 16;
    u64::from(x[j]) | (u64::from(x[j + 1]) << 32)
}

fn try_zeroed(len: usize) -> Result<Zeroizing<Vec<u32>>, CryptoError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| CryptoError::InvalidParameter("scrypt memory cost too large".into()))?;
    v.resize(len, 0);
    Ok(Zeroizing::new(v))
}

/// SMix on one `128 * r` byte block.
fn smix(block: &mut [u8], r: usize, n: u64, v: &mut [u32]) {
    let words = 32 * r;
    let mut x = Zeroizing::new(vec![0u32; words]);
    let mut y = Zeroizing::new(vec![0u32; words]);
    for (w, chunk) in x.iter_mut().zip(block.chunks_exact(4)) {
        *w = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for i in 0..n as usize {
        v[i * words..(i + 1) * words].copy_from_slice(&x);
        block_mix(&x, &mut y, r);
        core::mem::swap(&mut x, &mut y);
    }
    for _ in 0..n {
        let j = (integerify(&x, r) & (n - 1)) as usize;
        for (w, vj) in x.iter_mut().zip(&v[j * words..(j + 1) * words]) {
            *w ^= vj;
        }
        block_mix(&x, &mut y, r);
        core::mem::swap(&mut x, &mut y);
    }

    for (chunk, w) in block.chunks_exact_mut(4).zip(x.iter()) {
        chunk.copy_from_slice(&w.to_le_bytes());
    }
}

/// scrypt key derivation filling `out`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidParameter`] for invalid costs or when the
/// working memory cannot be allocated.
pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    params: ScryptParams,
    out: &mut [u8],
) -> Result<(), CryptoError> {
    params.validate()?;
    let r = params.r as usize;
    let p = params.p as usize;
    let n = 1u64 << params.n_log2;
    if params.r < 16 && u64::from(params.n_log2) >= 16 * u64::from(params.r) {
        return Err(CryptoError::InvalidParameter("scrypt N too large for r".into()));
    }

    let words_per_block = 32 * r;
    let v_len = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_mul(words_per_block))
        .ok_or_else(|| CryptoError::InvalidParameter("scrypt memory cost too large".into()))?;
    let mut v = try_zeroed(v_len)?;

    let block_len = 128 * r;
    let mut b = Zeroizing::new(vec![0u8; block_len * p]);
    pbkdf2_sha256(password, salt, &mut b)?;
    for block in b.chunks_exact_mut(block_len) {
        smix(block, r, n, &mut v);
    }
    pbkdf2_sha256(password, &b, out)
}

/// `crypto_pwhash_scryptsalsa208sha256`: raw derivation with a 32-byte salt.
///
/// # Errors
///
/// Returns an error if the salt is not 32 bytes or `outlen` is below 16.
pub fn pwhash_scryptsalsa208sha256(
    outlen: usize,
    passwd: &[u8],
    salt: &[u8],
    opslimit: u64,
    memlimit: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let salt = fixed_array::<SALT_BYTES>("salt", salt)?;
    if outlen < BYTES_MIN {
        return Err(CryptoError::InvalidParameter(format!(
            "output must be at least {BYTES_MIN} bytes"
        )));
    }
    let params = ScryptParams::pick(opslimit, memlimit);
    let mut out = Zeroizing::new(vec![0u8; outlen]);
    scrypt(passwd, salt, params, &mut out)?;
    Ok(out)
}

fn encode_u32(out: &mut String, mut value: u32, bits: u32) {
    let mut done = 0;
    while done < bits {
        out.push(ITOA64[(value & 0x3f) as usize] as char);
        value >>= 6;
        done += 6;
    }
}

fn encode_bytes(out: &mut String, data: &[u8]) {
    for group in data.chunks(3) {
        let mut value = 0u32;
        for (i, &byte) in group.iter().enumerate() {
            value |= u32::from(byte) << (8 * i);
        }
        encode_u32(out, value, 8 * group.len() as u32);
    }
}

fn decode_one(c: u8) -> Result<u32, CryptoError> {
    ITOA64
        .iter()
        .position(|&a| a == c)
        .map(|i| i as u32)
        .ok_or_else(|| CryptoError::InvalidEncoding(format!("invalid $7$ character {:?}", c as char)))
}

fn decode_u32(digits: &[u8]) -> Result<u32, CryptoError> {
    digits
        .iter()
        .enumerate()
        .try_fold(0u32, |acc, (i, &c)| Ok(acc | (decode_one(c)? << (6 * i))))
}

/// Parse the `$7$` setting: returns the costs and the salt characters.
fn parse_setting(encoded: &str) -> Result<(ScryptParams, &[u8]), CryptoError> {
    let bytes = encoded.as_bytes();
    let rest = bytes
        .strip_prefix(STR_PREFIX.as_bytes())
        .ok_or_else(|| CryptoError::InvalidEncoding("missing $7$ prefix".into()))?;
    if rest.len() < 11 {
        return Err(CryptoError::InvalidEncoding("truncated $7$ setting".into()));
    }
    let params = ScryptParams {
        n_log2: decode_one(rest[0])?,
        r: decode_u32(&rest[1..6])?,
        p: decode_u32(&rest[6..11])?,
    };
    let salt = &rest[11..];
    let salt = match salt.iter().rposition(|&c| c == b'$') {
        Some(end) => &salt[..end],
        None => salt,
    };
    Ok((params, salt))
}

fn hash_with_setting(
    passwd: &[u8],
    params: ScryptParams,
    salt_chars: &[u8],
) -> Result<Zeroizing<String>, CryptoError> {
    let mut hash = Zeroizing::new([0u8; 32]);
    scrypt(passwd, salt_chars, params, &mut hash[..])?;

    let mut out = Zeroizing::new(String::with_capacity(STR_BYTES));
    out.push_str(STR_PREFIX);
    out.push(ITOA64[params.n_log2 as usize] as char);
    encode_u32(&mut out, params.r, 30);
    encode_u32(&mut out, params.p, 30);
    for &c in salt_chars {
        out.push(c as char);
    }
    out.push('$');
    encode_bytes(&mut out, &hash[..]);
    Ok(out)
}

/// `crypto_pwhash_scryptsalsa208sha256_str`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if no salt could be drawn, or an
/// error from the key derivation.
pub fn pwhash_scryptsalsa208sha256_str(
    passwd: &[u8],
    opslimit: u64,
    memlimit: usize,
) -> Result<String, CryptoError> {
    let params = ScryptParams::pick(opslimit, memlimit);
    let mut raw_salt = [0u8; SALT_BYTES];
    fill_random(&mut raw_salt)?;
    let mut salt_chars = String::with_capacity(HASH_CHARS);
    encode_bytes(&mut salt_chars, &raw_salt);

    let encoded = hash_with_setting(passwd, params, salt_chars.as_bytes())?;
    Ok((*encoded).clone())
}

/// `crypto_pwhash_scryptsalsa208sha256_str_verify`.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] when the password does not
/// match, or [`CryptoError::InvalidEncoding`] for a malformed string.
pub fn pwhash_scryptsalsa208sha256_str_verify(passwd: &[u8], hash: &str) -> Result<(), CryptoError> {
    if hash.len() != STR_BYTES - 1 {
        return Err(CryptoError::InvalidEncoding(format!(
            "$7$ string must be {} characters",
            STR_BYTES - 1
        )));
    }
    let (params, salt_chars) = parse_setting(hash)?;
    let recomputed = hash_with_setting(passwd, params, salt_chars)?;
    if ct_eq(recomputed.as_bytes(), hash.as_bytes()) {
        Ok(())
    } else {
        tracing::debug!("scrypt hash verification failed");
        Err(CryptoError::AuthenticationFailed)
    }
}

/// `crypto_pwhash_scryptsalsa208sha256_str_needs_rehash`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEncoding`] for a malformed string.
pub fn pwhash_scryptsalsa208sha256_str_needs_rehash(
    hash: &str,
    opslimit: u64,
    memlimit: usize,
) -> Result<bool, CryptoError> {
    let wanted = ScryptParams::pick(opslimit, memlimit);
    if hash.len() != STR_BYTES - 1 {
        return Err(CryptoError::InvalidEncoding(format!(
            "$7$ string must be {} characters",
            STR_BYTES - 1
        )));
    }
    let (params, _) = parse_setting(hash)?;
    Ok(params != wanted)
}
