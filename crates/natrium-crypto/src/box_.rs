//! Public-key authenticated encryption (`crypto_box`) and sealed boxes.
//!
//! `crypto_box` is X25519 key agreement, HSalsa20 key derivation and
//! [`secretbox`](crate::secretbox) under the derived key. Sealed boxes add an
//! ephemeral sender key so only the recipient's public key is needed; the
//! nonce is BLAKE2b-192 of the ephemeral and recipient public keys.
//!
//! Legacy keypairs are 64 bytes: secret key followed by public key.

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::CryptoError;
use crate::curve25519::montgomery::{BASEPOINT, x25519};
use crate::curve25519::scalarmult;
use crate::error::{fixed_array, key_array, nonce_array};
use crate::generichash::generichash;
use crate::random::random_32;
use crate::secretbox;
use crate::stream::salsa20::hsalsa20;

/// Public key size.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Secret key size.
pub const SECRET_KEY_SIZE: usize = 32;

/// Combined keypair size (secret ‖ public).
pub const KEYPAIR_SIZE: usize = 64;

/// Seed size for [`seed_keypair`].
pub const SEED_SIZE: usize = 32;

/// Nonce size.
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size.
pub const MAC_SIZE: usize = 16;

/// Precomputed shared key size.
pub const BEFORENM_SIZE: usize = 32;

/// Overhead of a sealed box: ephemeral public key plus tag.
pub const SEAL_SIZE: usize = PUBLIC_KEY_SIZE + MAC_SIZE;

/// X25519 keypair for boxes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BoxKeyPair {
    secret: [u8; SECRET_KEY_SIZE],
    #[zeroize(skip)]
    public: [u8; PUBLIC_KEY_SIZE],
}

impl BoxKeyPair {
    /// Generate a random keypair.
    #[must_use]
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut secret = [0u8; SECRET_KEY_SIZE];
        rng.fill_bytes(&mut secret);
        let public = x25519(&secret, &BASEPOINT);
        Self { secret, public }
    }

    /// Build a keypair from a secret key, deriving the public key.
    #[must_use]
    pub fn from_secret(secret: [u8; SECRET_KEY_SIZE]) -> Self {
        let public = x25519(&secret, &BASEPOINT);
        Self { secret, public }
    }

    /// Split a 64-byte `secret ‖ public` keypair without checking that the
    /// halves match.
    ///
    /// # Errors
    ///
    /// Returns an error if `keypair` is not 64 bytes.
    pub fn from_bytes(keypair: &[u8]) -> Result<Self, CryptoError> {
        let keypair = fixed_array::<KEYPAIR_SIZE>("keypair", keypair)?;
        let mut secret = [0u8; SECRET_KEY_SIZE];
        let mut public = [0u8; PUBLIC_KEY_SIZE];
        secret.copy_from_slice(&keypair[..32]);
        public.copy_from_slice(&keypair[32..]);
        Ok(Self { secret, public })
    }

    /// `secret ‖ public`.
    #[must_use]
    pub fn to_bytes(&self) -> Zeroizing<[u8; KEYPAIR_SIZE]> {
        let mut out = Zeroizing::new([0u8; KEYPAIR_SIZE]);
        out[..32].copy_from_slice(&self.secret);
        out[32..].copy_from_slice(&self.public);
        out
    }

    /// The secret key.
    #[must_use]
    pub fn secret(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.secret
    }

    /// The public key.
    #[must_use]
    pub fn public(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public
    }
}

impl core::fmt::Debug for BoxKeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoxKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// `crypto_box_keypair`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn keypair() -> Result<BoxKeyPair, CryptoError> {
    let secret = Zeroizing::new(random_32()?);
    Ok(BoxKeyPair::from_secret(*secret))
}

/// `crypto_box_seed_keypair`: secret key = SHA-512(seed)[0..32].
///
/// # Errors
///
/// Returns an error if `seed` is not 32 bytes.
pub fn seed_keypair(seed: &[u8]) -> Result<BoxKeyPair, CryptoError> {
    use sha2::{Digest, Sha512};

    let seed = fixed_array::<SEED_SIZE>("seed", seed)?;
    let mut digest = Zeroizing::new([0u8; 64]);
    digest.copy_from_slice(&Sha512::digest(seed));
    let mut secret = [0u8; SECRET_KEY_SIZE];
    secret.copy_from_slice(&digest[..32]);
    Ok(BoxKeyPair::from_secret(secret))
}

/// `crypto_box_publickey_from_secretkey`.
///
/// # Errors
///
/// Returns an error if `secret` is not 32 bytes.
pub fn publickey_from_secretkey(secret: &[u8]) -> Result<[u8; PUBLIC_KEY_SIZE], CryptoError> {
    Ok(x25519(key_array(secret)?, &BASEPOINT))
}

/// `crypto_box_keypair_from_secretkey_and_publickey`: concatenate without
/// checking that the halves belong together.
///
/// # Errors
///
/// Returns an error if either key is not 32 bytes.
pub fn keypair_from_secretkey_and_publickey(
    secret: &[u8],
    public: &[u8],
) -> Result<BoxKeyPair, CryptoError> {
    let secret = key_array::<SECRET_KEY_SIZE>(secret)?;
    let public = fixed_array::<PUBLIC_KEY_SIZE>("public key", public)?;
    Ok(BoxKeyPair {
        secret: *secret,
        public: *public,
    })
}

/// `crypto_box_publickey`: the public half of a 64-byte keypair.
///
/// # Errors
///
/// Returns an error if `keypair` is not 64 bytes.
pub fn publickey(keypair: &[u8]) -> Result<[u8; PUBLIC_KEY_SIZE], CryptoError> {
    Ok(*BoxKeyPair::from_bytes(keypair)?.public())
}

/// `crypto_box_secretkey`: the secret half of a 64-byte keypair.
///
/// # Errors
///
/// Returns an error if `keypair` is not 64 bytes.
pub fn secretkey(keypair: &[u8]) -> Result<Zeroizing<[u8; SECRET_KEY_SIZE]>, CryptoError> {
    Ok(Zeroizing::new(*BoxKeyPair::from_bytes(keypair)?.secret()))
}

/// `crypto_box_beforenm`: `HSalsa20(X25519(sk, pk), 0)`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] for low-order public keys.
pub fn beforenm(public: &[u8], secret: &[u8]) -> Result<Zeroizing<[u8; BEFORENM_SIZE]>, CryptoError> {
    let shared = Zeroizing::new(scalarmult(secret, public)?);
    Ok(Zeroizing::new(hsalsa20(&[0u8; 16], &shared[..])?))
}

/// `crypto_box_easy`: returns `tag ‖ ciphertext`.
///
/// # Errors
///
/// Returns an error on bad lengths or a low-order public key.
pub fn easy(
    message: &[u8],
    nonce: &[u8],
    public: &[u8],
    secret: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    nonce_array::<NONCE_SIZE>(nonce)?;
    let k = beforenm(public, secret)?;
    secretbox::secretbox(message, nonce, &k[..])
}

/// `crypto_box_open_easy`.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the box does not verify.
pub fn open_easy(
    ciphertext: &[u8],
    nonce: &[u8],
    public: &[u8],
    secret: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    nonce_array::<NONCE_SIZE>(nonce)?;
    let k = beforenm(public, secret)?;
    secretbox::secretbox_open(ciphertext, nonce, &k[..])
}

/// `crypto_box_detached`: returns `(ciphertext, tag)`.
///
/// # Errors
///
/// Returns an error on bad lengths or a low-order public key.
pub fn detached(
    message: &[u8],
    nonce: &[u8],
    public: &[u8],
    secret: &[u8],
) -> Result<(Vec<u8>, [u8; MAC_SIZE]), CryptoError> {
    nonce_array::<NONCE_SIZE>(nonce)?;
    let k = beforenm(public, secret)?;
    secretbox::secretbox_detached(message, nonce, &k[..])
}

/// `crypto_box_open_detached`.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the tag does not verify.
pub fn open_detached(
    ciphertext: &[u8],
    mac: &[u8],
    nonce: &[u8],
    public: &[u8],
    secret: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    nonce_array::<NONCE_SIZE>(nonce)?;
    let k = beforenm(public, secret)?;
    secretbox::secretbox_open_detached(ciphertext, mac, nonce, &k[..])
}

/// `crypto_box_easy_afternm`: box under a precomputed key.
///
/// # Errors
///
/// Returns an error on bad key or nonce lengths.
pub fn easy_afternm(message: &[u8], nonce: &[u8], k: &[u8]) -> Result<Vec<u8>, CryptoError> {
    secretbox::secretbox(message, nonce, k)
}

/// `crypto_box_open_easy_afternm`.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the box does not verify.
pub fn open_easy_afternm(ciphertext: &[u8], nonce: &[u8], k: &[u8]) -> Result<Vec<u8>, CryptoError> {
    secretbox::secretbox_open(ciphertext, nonce, k)
}

fn seal_nonce(ephemeral_pk: &[u8; 32], recipient_pk: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(ephemeral_pk);
    input[32..].copy_from_slice(recipient_pk);
    generichash(&input, &[], NONCE_SIZE)
}

/// Sealed box with a caller-supplied ephemeral keypair.
fn seal_with(
    message: &[u8],
    recipient_pk: &[u8; PUBLIC_KEY_SIZE],
    ephemeral: &BoxKeyPair,
) -> Result<Vec<u8>, CryptoError> {
    let nonce = seal_nonce(ephemeral.public(), recipient_pk)?;
    let boxed = easy(message, &nonce, recipient_pk, ephemeral.secret())?;

    let mut out = Vec::with_capacity(PUBLIC_KEY_SIZE + boxed.len());
    out.extend_from_slice(ephemeral.public());
    out.extend_from_slice(&boxed);
    Ok(out)
}

/// `crypto_box_seal`: anonymous encryption to `recipient_pk`.
///
/// Output is `ephemeral_pk ‖ tag ‖ ciphertext`. The ephemeral secret key is
/// wiped before returning.
///
/// # Errors
///
/// Returns an error if `recipient_pk` is not 32 bytes or is a low-order
/// point.
pub fn seal(message: &[u8], recipient_pk: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let recipient_pk = fixed_array::<PUBLIC_KEY_SIZE>("public key", recipient_pk)?;
    let ephemeral = keypair()?;
    seal_with(message, recipient_pk, &ephemeral)
}

/// `crypto_box_seal_open` with a 64-byte `secret ‖ public` keypair.
///
/// The recipient public key used for the nonce is re-derived from the
/// secret half.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the box does not
/// verify, or a length error for short input.
pub fn seal_open(ciphertext: &[u8], keypair: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let keypair = BoxKeyPair::from_bytes(keypair)?;
    if ciphertext.len() < SEAL_SIZE {
        return Err(CryptoError::length("sealed box", SEAL_SIZE, ciphertext.len()));
    }
    let (epk, boxed) = ciphertext.split_at(PUBLIC_KEY_SIZE);
    let epk = fixed_array::<PUBLIC_KEY_SIZE>("ephemeral key", epk)?;

    let recipient = BoxKeyPair::from_secret(*keypair.secret());
    let nonce = seal_nonce(epk, recipient.public())?;
    open_easy(boxed, &nonce, epk, recipient.secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    const ALICE_SK: &str = "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a";
    const ALICE_PK: &str = "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a";
    const BOB_SK: &str = "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb";
    const BOB_PK: &str = "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f";
    const NONCE: &str = "69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37";

    #[test]
    fn test_beforenm_nacl_firstkey() {
        let k = beforenm(&h(BOB_PK), &h(ALICE_SK)).unwrap();
        assert_eq!(
            k.to_vec(),
            h("1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389")
        );
        let k2 = beforenm(&h(ALICE_PK), &h(BOB_SK)).unwrap();
        assert_eq!(k, k2);
    }

    #[test]
    fn test_box_both_directions() {
        let msg = b"nacl box between alice and bob";
        let boxed = easy(msg, &h(NONCE), &h(BOB_PK), &h(ALICE_SK)).unwrap();
        assert_eq!(boxed.len(), msg.len() + MAC_SIZE);
        assert_eq!(open_easy(&boxed, &h(NONCE), &h(ALICE_PK), &h(BOB_SK)).unwrap(), msg);

        let k = beforenm(&h(BOB_PK), &h(ALICE_SK)).unwrap();
        assert_eq!(easy_afternm(msg, &h(NONCE), &k[..]).unwrap(), boxed);
        assert_eq!(open_easy_afternm(&boxed, &h(NONCE), &k[..]).unwrap(), msg);
    }

    #[test]
    fn test_detached() {
        let (ct, mac) = detached(b"detached", &h(NONCE), &h(BOB_PK), &h(ALICE_SK)).unwrap();
        assert_eq!(
            open_detached(&ct, &mac, &h(NONCE), &h(ALICE_PK), &h(BOB_SK)).unwrap(),
            b"detached"
        );
        let mut bad = mac;
        bad[0] ^= 1;
        assert_eq!(
            open_detached(&ct, &bad, &h(NONCE), &h(ALICE_PK), &h(BOB_SK)),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_keypair_helpers() {
        let pair = keypair_from_secretkey_and_publickey(&h(ALICE_SK), &h(ALICE_PK)).unwrap();
        let bytes = pair.to_bytes();
        assert_eq!(&bytes[..32], &h(ALICE_SK)[..]);
        assert_eq!(publickey(&bytes[..]).unwrap().to_vec(), h(ALICE_PK));
        assert_eq!(secretkey(&bytes[..]).unwrap().to_vec(), h(ALICE_SK));
        assert_eq!(publickey_from_secretkey(&h(ALICE_SK)).unwrap().to_vec(), h(ALICE_PK));

        // halves are not cross-checked
        let mismatched = keypair_from_secretkey_and_publickey(&h(ALICE_SK), &h(BOB_PK)).unwrap();
        assert_eq!(mismatched.public().to_vec(), h(BOB_PK));
        assert!(publickey(&[0u8; 63]).is_err());
    }

    #[test]
    fn test_seed_keypair_deterministic() {
        let a = seed_keypair(&[7u8; 32]).unwrap();
        let b = seed_keypair(&[7u8; 32]).unwrap();
        assert_eq!(a.public(), b.public());
        assert_eq!(publickey_from_secretkey(a.secret()).unwrap(), *a.public());
        assert_ne!(seed_keypair(&[8u8; 32]).unwrap().public(), a.public());
        assert!(seed_keypair(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_keypair_is_fresh_and_consistent() {
        let a = keypair().unwrap();
        let b = keypair().unwrap();
        assert_ne!(a.public(), b.public());
        assert_eq!(publickey_from_secretkey(a.secret()).unwrap(), *a.public());
    }

    #[test]
    fn test_seal_roundtrip() {
        let recipient = keypair().unwrap();
        let sealed = seal(b"anonymous", recipient.public()).unwrap();
        assert_eq!(sealed.len(), 9 + SEAL_SIZE);
        assert_eq!(
            seal_open(&sealed, &recipient.to_bytes()[..]).unwrap(),
            b"anonymous"
        );

        let other = keypair().unwrap();
        assert_eq!(
            seal_open(&sealed, &other.to_bytes()[..]),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_seal_layout_is_deterministic_given_ephemeral() {
        let recipient = BoxKeyPair::from_secret([0x21; 32]);
        let ephemeral = BoxKeyPair::from_secret([0x43; 32]);
        let a = seal_with(b"m", recipient.public(), &ephemeral).unwrap();
        let b = seal_with(b"m", recipient.public(), &ephemeral).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..32], ephemeral.public());
        assert_eq!(seal_open(&a, &recipient.to_bytes()[..]).unwrap(), b"m");
    }

    #[test]
    fn test_seal_open_uses_derived_public_key() {
        // a keypair whose public half is wrong still opens
        let recipient = keypair().unwrap();
        let sealed = seal(b"derived", recipient.public()).unwrap();
        let mut bytes = *recipient.to_bytes();
        bytes[32..].fill(0);
        assert_eq!(seal_open(&sealed, &bytes).unwrap(), b"derived");
    }

    #[test]
    fn test_seal_rejects_short_and_low_order() {
        let recipient = keypair().unwrap();
        assert!(matches!(
            seal_open(&[0u8; 47], &recipient.to_bytes()[..]),
            Err(CryptoError::InvalidLength { .. })
        ));
        assert_eq!(seal(b"m", &[0u8; 32]), Err(CryptoError::InvalidPublicKey));
    }
}
