//! Argon2i / Argon2id over the `argon2` crate.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Params, ParamsBuilder, Version};
use zeroize::Zeroizing;

use super::{Algorithm, BYTES_MIN, MEMLIMIT_MIN, OPSLIMIT_MAX, SALT_BYTES, STR_BYTES};
use crate::CryptoError;
use crate::error::fixed_array;
use crate::random::fill_random;

impl From<Algorithm> for argon2::Algorithm {
    fn from(alg: Algorithm) -> Self {
        match alg {
            Algorithm::Argon2i13 => Self::Argon2i,
            Algorithm::Argon2id13 => Self::Argon2id,
        }
    }
}

fn check_limits(alg: Algorithm, opslimit: u64, memlimit: usize) -> Result<(), CryptoError> {
    if opslimit < alg.opslimit_min() || opslimit > OPSLIMIT_MAX {
        return Err(CryptoError::InvalidParameter(format!(
            "opslimit {opslimit} out of range for {alg:?}"
        )));
    }
    if memlimit < MEMLIMIT_MIN {
        return Err(CryptoError::InvalidParameter(format!(
            "memlimit must be at least {MEMLIMIT_MIN} bytes"
        )));
    }
    Ok(())
}

/// Build the hasher for one lane with the given costs.
fn hasher(
    alg: Algorithm,
    opslimit: u64,
    memlimit: usize,
    outlen: Option<usize>,
) -> Result<Argon2<'static>, CryptoError> {
    check_limits(alg, opslimit, memlimit)?;
    let m_cost = u32::try_from(memlimit / 1024)
        .map_err(|_| CryptoError::InvalidParameter("memlimit too large".into()))?;
    let t_cost = u32::try_from(opslimit)
        .map_err(|_| CryptoError::InvalidParameter("opslimit too large".into()))?;

    let mut builder = ParamsBuilder::new();
    builder.m_cost(m_cost).t_cost(t_cost).p_cost(1);
    if let Some(len) = outlen {
        builder.output_len(len);
    }
    let params = builder
        .build()
        .map_err(|e| CryptoError::InvalidParameter(format!("Argon2 params: {e}")))?;

    Ok(Argon2::new(alg.into(), Version::V0x13, params))
}

/// `crypto_pwhash`: derive `outlen` bytes from `passwd` and a 16-byte salt.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidParameter`] when `outlen` is below 16 or
/// the limits are outside the accepted range, and a length error for a
/// salt that is not 16 bytes.
pub fn pwhash(
    outlen: usize,
    passwd: &[u8],
    salt: &[u8],
    opslimit: u64,
    memlimit: usize,
    alg: Algorithm,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let salt = fixed_array::<SALT_BYTES>("salt", salt)?;
    if outlen < BYTES_MIN {
        return Err(CryptoError::InvalidParameter(format!(
            "output must be at least {BYTES_MIN} bytes"
        )));
    }
    let argon2 = hasher(alg, opslimit, memlimit, Some(outlen))?;

    let mut out = Zeroizing::new(vec![0u8; outlen]);
    argon2
        .hash_password_into(passwd, salt, &mut out)
        .map_err(|e| CryptoError::InvalidParameter(format!("Argon2: {e}")))?;
    Ok(out)
}

/// `crypto_pwhash_str` with Argon2id.
///
/// # Errors
///
/// See [`pwhash_str_alg`].
pub fn pwhash_str(passwd: &[u8], opslimit: u64, memlimit: usize) -> Result<String, CryptoError> {
    pwhash_str_alg(passwd, opslimit, memlimit, Algorithm::Argon2id13)
}

/// `crypto_pwhash_str_alg`: PHC string with a fresh random 16-byte salt.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidParameter`] for out-of-range limits, or
/// [`CryptoError::RandomFailed`] if no salt could be drawn.
pub fn pwhash_str_alg(
    passwd: &[u8],
    opslimit: u64,
    memlimit: usize,
    alg: Algorithm,
) -> Result<String, CryptoError> {
    let argon2 = hasher(alg, opslimit, memlimit, None)?;

    let mut salt = [0u8; SALT_BYTES];
    fill_random(&mut salt)?;
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| CryptoError::InvalidParameter(format!("salt: {e}")))?;

    let hash = argon2
        .hash_password(passwd, &salt)
        .map_err(|e| CryptoError::InvalidParameter(format!("Argon2: {e}")))?;
    Ok(hash.to_string())
}

/// Parse a string produced by [`pwhash_str_alg`], refusing anything that is
/// not Argon2i/Argon2id version 0x13.
fn parse(hash: &str) -> Result<PasswordHash<'_>, CryptoError> {
    if hash.len() >= STR_BYTES {
        return Err(CryptoError::InvalidEncoding("password hash too long".into()));
    }
    let parsed =
        PasswordHash::new(hash).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    match parsed.algorithm.as_str() {
        "argon2i" | "argon2id" => {}
        other => {
            return Err(CryptoError::InvalidEncoding(format!(
                "unsupported algorithm {other}"
            )));
        }
    }
    if parsed.version != Some(0x13) {
        return Err(CryptoError::InvalidEncoding("unsupported Argon2 version".into()));
    }
    Ok(parsed)
}

/// `crypto_pwhash_str_verify`: recompute with the string's own parameters
/// and compare in constant time.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] when the password does not
/// match, or [`CryptoError::InvalidEncoding`] for a malformed string.
pub fn pwhash_str_verify(passwd: &[u8], hash: &str) -> Result<(), CryptoError> {
    let parsed = parse(hash)?;
    match Argon2::default().verify_password(passwd, &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => {
            tracing::debug!("password hash verification failed");
            Err(CryptoError::AuthenticationFailed)
        }
        Err(e) => Err(CryptoError::InvalidEncoding(e.to_string())),
    }
}

/// `crypto_pwhash_str_needs_rehash`: whether `hash` was produced with costs
/// other than `opslimit` / `memlimit`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEncoding`] for a malformed string.
pub fn pwhash_str_needs_rehash(
    hash: &str,
    opslimit: u64,
    memlimit: usize,
) -> Result<bool, CryptoError> {
    let parsed = parse(hash)?;
    let params =
        Params::try_from(&parsed).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    Ok(u64::from(params.t_cost()) != opslimit
        || params.m_cost() as usize != memlimit / 1024)
}
