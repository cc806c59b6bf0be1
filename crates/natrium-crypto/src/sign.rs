//! Ed25519 signatures (`crypto_sign`).
//!
//! Secret keys are 64 bytes, `seed ‖ public`, as in libsodium. Signing
//! follows RFC 8032 with the public half of the secret key used in the
//! challenge hash. Verification rejects the same inputs libsodium does:
//! `S ≥ ℓ`, small-order `R` or `A`, and non-canonical `A`.

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::CryptoError;
use crate::constant_time::verify_32;
use crate::curve25519::edwards::is_canonical_encoding;
use crate::curve25519::scalar::clamp;
use crate::curve25519::{EdwardsPoint, Scalar};
use crate::error::{fixed_array, key_array};
use crate::random::random_32;

/// Public key size.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Secret key size (`seed ‖ public`).
pub const SECRET_KEY_SIZE: usize = 64;

/// Combined keypair size (`secret ‖ public`).
pub const KEYPAIR_SIZE: usize = 96;

/// Seed size.
pub const SEED_SIZE: usize = 32;

/// Signature size.
pub const SIGNATURE_SIZE: usize = 64;

/// Curve25519 key size produced by the conversion helpers.
pub const CURVE25519_KEY_SIZE: usize = 32;

/// Ed25519 keypair.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SignKeyPair {
    secret: [u8; SECRET_KEY_SIZE],
    #[zeroize(skip)]
    public: [u8; PUBLIC_KEY_SIZE],
}

impl SignKeyPair {
    /// Generate a random keypair.
    #[must_use]
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
        rng.fill_bytes(&mut seed[..]);
        Self::from_seed(&seed)
    }

    /// Derive the keypair for a 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; SEED_SIZE]) -> Self {
        let az = expand_seed(seed);
        let mut a = Zeroizing::new([0u8; 32]);
        a.copy_from_slice(&az[..32]);
        let public = EdwardsPoint::mul_base(&a).compress();

        let mut secret = [0u8; SECRET_KEY_SIZE];
        secret[..32].copy_from_slice(seed);
        secret[32..].copy_from_slice(&public);
        Self { secret, public }
    }

    /// Split a 96-byte `secret ‖ public` keypair.
    ///
    /// # Errors
    ///
    /// Returns an error if `keypair` is not 96 bytes.
    pub fn from_bytes(keypair: &[u8]) -> Result<Self, CryptoError> {
        let keypair = fixed_array::<KEYPAIR_SIZE>("keypair", keypair)?;
        let mut secret = [0u8; SECRET_KEY_SIZE];
        let mut public = [0u8; PUBLIC_KEY_SIZE];
        secret.copy_from_slice(&keypair[..64]);
        public.copy_from_slice(&keypair[64..]);
        Ok(Self { secret, public })
    }

    /// `secret ‖ public`.
    #[must_use]
    pub fn to_bytes(&self) -> Zeroizing<[u8; KEYPAIR_SIZE]> {
        let mut out = Zeroizing::new([0u8; KEYPAIR_SIZE]);
        out[..64].copy_from_slice(&self.secret);
        out[64..].copy_from_slice(&self.public);
        out
    }

    /// The 64-byte secret key.
    #[must_use]
    pub fn secret(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.secret
    }

    /// The public key.
    #[must_use]
    pub fn public(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public
    }

    /// Detached signature over `message`.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        sign_with(message, &self.secret)
    }
}

impl core::fmt::Debug for SignKeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// SHA-512 of the seed with the lower half clamped.
fn expand_seed(seed: &[u8; SEED_SIZE]) -> Zeroizing<[u8; 64]> {
    let mut az = Zeroizing::new([0u8; 64]);
    az.copy_from_slice(&Sha512::digest(seed));
    let mut a = [0u8; 32];
    a.copy_from_slice(&az[..32]);
    clamp(&mut a);
    az[..32].copy_from_slice(&a);
    a.zeroize();
    az
}

fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    let s = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();
    s
}

fn sign_with(message: &[u8], secret: &[u8; SECRET_KEY_SIZE]) -> [u8; SIGNATURE_SIZE] {
    let mut seed = [0u8; SEED_SIZE];
    seed.copy_from_slice(&secret[..32]);
    let az = expand_seed(&seed);
    seed.zeroize();

    let mut r = hash_to_scalar(&[&az[32..], message]);
    let big_r = EdwardsPoint::mul_base(&r.to_bytes()).compress();
    let k = hash_to_scalar(&[&big_r[..], &secret[32..], message]);

    let mut a_bytes = [0u8; 32];
    a_bytes.copy_from_slice(&az[..32]);
    let mut a = Scalar(a_bytes);
    let s = Scalar::mul_add(&k, &a, &r);
    a_bytes.zeroize();
    a.zeroize();
    r.zeroize();

    let mut sig = [0u8; SIGNATURE_SIZE];
    sig[..32].copy_from_slice(&big_r);
    sig[32..].copy_from_slice(&s.to_bytes());
    sig
}

fn verify_with(
    sig: &[u8; SIGNATURE_SIZE],
    message: &[u8],
    public: &[u8; PUBLIC_KEY_SIZE],
) -> bool {
    let mut r_bytes = [0u8; 32];
    let mut s_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&sig[..32]);
    s_bytes.copy_from_slice(&sig[32..]);

    if !Scalar::is_canonical(&s_bytes) {
        return false;
    }
    if EdwardsPoint::decompress(&r_bytes).is_some_and(|r| r.is_small_order()) {
        return false;
    }
    if !is_canonical_encoding(public) {
        return false;
    }
    let Some(a) = EdwardsPoint::decompress(public) else {
        return false;
    };
    if a.is_small_order() {
        return false;
    }

    let k = hash_to_scalar(&[&r_bytes[..], &public[..], message]);
    let check = EdwardsPoint::mul_base(&s_bytes)
        .sub(&a.mul(&k.to_bytes()))
        .compress();
    verify_32(&check, &r_bytes)
}

/// `crypto_sign_keypair`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn keypair() -> Result<SignKeyPair, CryptoError> {
    let seed = Zeroizing::new(random_32()?);
    Ok(SignKeyPair::from_seed(&seed))
}

/// `crypto_sign_seed_keypair`.
///
/// # Errors
///
/// Returns an error if `seed` is not 32 bytes.
pub fn seed_keypair(seed: &[u8]) -> Result<SignKeyPair, CryptoError> {
    Ok(SignKeyPair::from_seed(fixed_array("seed", seed)?))
}

/// `crypto_sign_keypair_from_secretkey_and_publickey`.
///
/// # Errors
///
/// Returns an error if `secret` is not 64 bytes or `public` is not 32.
pub fn keypair_from_secretkey_and_publickey(
    secret: &[u8],
    public: &[u8],
) -> Result<SignKeyPair, CryptoError> {
    let secret = key_array::<SECRET_KEY_SIZE>(secret)?;
    let public = fixed_array::<PUBLIC_KEY_SIZE>("public key", public)?;
    Ok(SignKeyPair {
        secret: *secret,
        public: *public,
    })
}

/// `crypto_sign_publickey_from_secretkey`: recompute the public key from
/// the seed half.
///
/// # Errors
///
/// Returns an error if `secret` is not 64 bytes.
pub fn publickey_from_secretkey(secret: &[u8]) -> Result<[u8; PUBLIC_KEY_SIZE], CryptoError> {
    let seed = sk_to_seed(secret)?;
    Ok(*SignKeyPair::from_seed(&seed).public())
}

/// `crypto_sign_publickey`: the public half of a 96-byte keypair.
///
/// # Errors
///
/// Returns an error if `keypair` is not 96 bytes.
pub fn publickey(keypair: &[u8]) -> Result<[u8; PUBLIC_KEY_SIZE], CryptoError> {
    Ok(*SignKeyPair::from_bytes(keypair)?.public())
}

/// `crypto_sign_secretkey`: the 64-byte secret half of a keypair.
///
/// # Errors
///
/// Returns an error if `keypair` is not 96 bytes.
pub fn secretkey(keypair: &[u8]) -> Result<Zeroizing<[u8; SECRET_KEY_SIZE]>, CryptoError> {
    Ok(Zeroizing::new(*SignKeyPair::from_bytes(keypair)?.secret()))
}

/// `crypto_sign_ed25519_sk_to_seed`.
///
/// # Errors
///
/// Returns an error if `secret` is not 64 bytes.
pub fn sk_to_seed(secret: &[u8]) -> Result<Zeroizing<[u8; SEED_SIZE]>, CryptoError> {
    let secret = key_array::<SECRET_KEY_SIZE>(secret)?;
    let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
    seed.copy_from_slice(&secret[..32]);
    Ok(seed)
}

/// `crypto_sign_ed25519_sk_to_pk`: the stored public half.
///
/// # Errors
///
/// Returns an error if `secret` is not 64 bytes.
pub fn sk_to_pk(secret: &[u8]) -> Result<[u8; PUBLIC_KEY_SIZE], CryptoError> {
    let secret = key_array::<SECRET_KEY_SIZE>(secret)?;
    let mut pk = [0u8; PUBLIC_KEY_SIZE];
    pk.copy_from_slice(&secret[32..]);
    Ok(pk)
}

/// `crypto_sign_detached`.
///
/// # Errors
///
/// Returns an error if `secret` is not 64 bytes.
pub fn detached(message: &[u8], secret: &[u8]) -> Result<[u8; SIGNATURE_SIZE], CryptoError> {
    Ok(sign_with(message, key_array(secret)?))
}

/// `crypto_sign`: `signature ‖ message`.
///
/// # Errors
///
/// Returns an error if `secret` is not 64 bytes.
pub fn sign(message: &[u8], secret: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let sig = detached(message, secret)?;
    let mut out = Vec::with_capacity(SIGNATURE_SIZE + message.len());
    out.extend_from_slice(&sig);
    out.extend_from_slice(message);
    Ok(out)
}

/// `crypto_sign_verify_detached`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] if the signature does not
/// verify, or a length error for malformed arguments.
pub fn verify_detached(signature: &[u8], message: &[u8], public: &[u8]) -> Result<(), CryptoError> {
    let signature = fixed_array::<SIGNATURE_SIZE>("signature", signature)?;
    let public = fixed_array::<PUBLIC_KEY_SIZE>("public key", public)?;
    if verify_with(signature, message, public) {
        Ok(())
    } else {
        tracing::debug!(message_len = message.len(), "ed25519 verification failed");
        Err(CryptoError::InvalidSignature)
    }
}

/// `crypto_sign_open`: verify `signature ‖ message` and return the message.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] if verification fails.
pub fn open(signed: &[u8], public: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if signed.len() < SIGNATURE_SIZE {
        return Err(CryptoError::length("signed message", SIGNATURE_SIZE, signed.len()));
    }
    let (sig, message) = signed.split_at(SIGNATURE_SIZE);
    verify_detached(sig, message, public)?;
    Ok(message.to_vec())
}

/// `crypto_sign_ed25519_pk_to_curve25519`: u = (1 + y) / (1 - y).
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] for encodings that are not
/// points, or points of small order or outside the prime-order subgroup.
pub fn pk_to_curve25519(public: &[u8]) -> Result<[u8; CURVE25519_KEY_SIZE], CryptoError> {
    let public = fixed_array::<PUBLIC_KEY_SIZE>("public key", public)?;
    let point = EdwardsPoint::decompress(public).ok_or(CryptoError::InvalidPublicKey)?;
    if point.is_small_order() || !point.is_torsion_free() {
        return Err(CryptoError::InvalidPublicKey);
    }
    Ok(point.to_montgomery())
}

/// `crypto_sign_ed25519_sk_to_curve25519`: clamped SHA-512(seed)[0..32].
///
/// # Errors
///
/// Returns an error if `secret` is not 64 bytes.
pub fn sk_to_curve25519(secret: &[u8]) -> Result<Zeroizing<[u8; CURVE25519_KEY_SIZE]>, CryptoError> {
    let seed = sk_to_seed(secret)?;
    let az = expand_seed(&seed);
    let mut out = Zeroizing::new([0u8; CURVE25519_KEY_SIZE]);
    out.copy_from_slice(&az[..32]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve25519::scalarmult_base;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    const SEED_1: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PK_1: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const SIG_1: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

    #[test]
    fn test_rfc8032_test_1() {
        let pair = seed_keypair(&h(SEED_1)).unwrap();
        assert_eq!(pair.public().to_vec(), h(PK_1));
        let sig = detached(b"", pair.secret()).unwrap();
        assert_eq!(sig.to_vec(), h(SIG_1));
        verify_detached(&sig, b"", pair.public()).unwrap();
    }

    #[test]
    fn test_rfc8032_test_3() {
        let pair = seed_keypair(&h(
            "c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7",
        ))
        .unwrap();
        assert_eq!(
            pair.public().to_vec(),
            h("fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025")
        );
        assert_eq!(
            pair.sign(&[0xaf, 0x82]).to_vec(),
            h("6291d657deec24024827e69c3abe01a30ce548a284743a445e3680d7db5ac3ac18ff9b538d16f290ae67f760984dc6594a7c15e9716ed28dc027beceea1ec40a")
        );
    }

    #[test]
    fn test_sign_open_roundtrip() {
        let pair = keypair().unwrap();
        let signed = sign(b"attack at dawn", pair.secret()).unwrap();
        assert_eq!(signed.len(), SIGNATURE_SIZE + 14);
        assert_eq!(open(&signed, pair.public()).unwrap(), b"attack at dawn");

        let mut tampered = signed.clone();
        tampered[70] ^= 1;
        assert_eq!(open(&tampered, pair.public()), Err(CryptoError::InvalidSignature));
        assert!(matches!(
            open(&signed[..63], pair.public()),
            Err(CryptoError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let a = keypair().unwrap();
        let b = keypair().unwrap();
        let sig = a.sign(b"msg");
        assert_eq!(
            verify_detached(&sig, b"msg", b.public()),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_non_canonical_s_rejected() {
        let pair = seed_keypair(&h(SEED_1)).unwrap();
        let mut sig = detached(b"", pair.secret()).unwrap();
        // S + ℓ verifies arithmetically but must be refused
        let mut carry = 0u16;
        for (s, l) in sig[32..].iter_mut().zip(Scalar::ORDER_BYTES.iter()) {
            let t = u16::from(*s) + u16::from(*l) + carry;
            *s = t as u8;
            carry = t >> 8;
        }
        assert_eq!(carry, 0);
        assert_eq!(
            verify_detached(&sig, b"", pair.public()),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_small_order_keys_rejected() {
        let pair = keypair().unwrap();
        let sig = pair.sign(b"m");

        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert!(verify_detached(&sig, b"m", &identity).is_err());
        assert!(verify_detached(&sig, b"m", &[0u8; 32]).is_err());

        // small-order R with S = 0
        let mut forged = [0u8; 64];
        forged[..32].copy_from_slice(&identity);
        assert!(verify_detached(&forged, b"m", pair.public()).is_err());
    }

    #[test]
    fn test_non_canonical_public_key_rejected() {
        let mut pk = [0xffu8; 32];
        pk[0] = 0xee;
        pk[31] = 0x7f;
        assert!(!is_canonical_encoding(&pk));
        let sig = keypair().unwrap().sign(b"m");
        assert!(verify_detached(&sig, b"m", &pk).is_err());
    }

    #[test]
    fn test_key_accessors() {
        let pair = seed_keypair(&h(SEED_1)).unwrap();
        let bytes = pair.to_bytes();
        assert_eq!(publickey(&bytes[..]).unwrap(), *pair.public());
        assert_eq!(secretkey(&bytes[..]).unwrap().to_vec(), pair.secret().to_vec());
        assert_eq!(sk_to_seed(pair.secret()).unwrap().to_vec(), h(SEED_1));
        assert_eq!(sk_to_pk(pair.secret()).unwrap(), *pair.public());
        assert_eq!(publickey_from_secretkey(pair.secret()).unwrap(), *pair.public());

        let rebuilt =
            keypair_from_secretkey_and_publickey(pair.secret(), pair.public()).unwrap();
        assert_eq!(rebuilt.secret(), pair.secret());
        assert!(sk_to_seed(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_curve25519_conversion_vectors() {
        let pair = seed_keypair(&h(SEED_1)).unwrap();
        let xsk = sk_to_curve25519(pair.secret()).unwrap();
        let xpk = pk_to_curve25519(pair.public()).unwrap();
        assert_eq!(
            xsk.to_vec(),
            h("307c83864f2833cb427a2ef1c00a013cfdff2768d980c0a3a520f006904de94f")
        );
        assert_eq!(
            xpk.to_vec(),
            h("d85e07ec22b0ad881537c2f44d662d1a143cf830c57aca4305d85c7a90f6b62e")
        );
        assert_eq!(scalarmult_base(&xsk[..]).unwrap(), xpk);
    }

    #[test]
    fn test_curve25519_conversion_consistent() {
        let pair = keypair().unwrap();
        let xsk = sk_to_curve25519(pair.secret()).unwrap();
        let xpk = pk_to_curve25519(pair.public()).unwrap();
        assert_eq!(scalarmult_base(&xsk[..]).unwrap(), xpk);

        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert_eq!(pk_to_curve25519(&identity), Err(CryptoError::InvalidPublicKey));
    }
}
