//! X25519 key exchange (`crypto_kx`).
//!
//! Both sides hash the shared point together with the client and server
//! public keys, so the derived keys are bound to the pair of identities.
//! The session-key form splits a BLAKE2b-512 digest into a receive and a
//! transmit key; the legacy [`kx`] form returns a single BLAKE2b-256 key.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::CryptoError;
use crate::box_::BoxKeyPair;
use crate::curve25519::scalarmult;
use crate::error::{fixed_array, key_array};
use crate::generichash::{GenericHashState, generichash};

/// Public key size.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Secret key size.
pub const SECRET_KEY_SIZE: usize = 32;

/// Seed size.
pub const SEED_SIZE: usize = 32;

/// Size of each session key.
pub const SESSION_KEY_SIZE: usize = 32;

/// Key-exchange keypairs are ordinary X25519 keypairs.
pub type KxKeyPair = BoxKeyPair;

/// Receive and transmit keys for one side of a session.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    rx: [u8; SESSION_KEY_SIZE],
    tx: [u8; SESSION_KEY_SIZE],
}

impl SessionKeys {
    /// Key for decrypting data from the peer.
    #[must_use]
    pub fn rx(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.rx
    }

    /// Key for encrypting data to the peer.
    #[must_use]
    pub fn tx(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.tx
    }
}

impl core::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionKeys([REDACTED])")
    }
}

/// `crypto_kx_keypair`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn keypair() -> Result<KxKeyPair, CryptoError> {
    crate::box_::keypair()
}

/// `crypto_kx_seed_keypair`: secret key = BLAKE2b-256(seed).
///
/// # Errors
///
/// Returns an error if `seed` is not 32 bytes.
pub fn seed_keypair(seed: &[u8]) -> Result<KxKeyPair, CryptoError> {
    let seed = fixed_array::<SEED_SIZE>("seed", seed)?;
    let digest = Zeroizing::new(generichash(seed, &[], SECRET_KEY_SIZE)?);
    let mut secret = [0u8; SECRET_KEY_SIZE];
    secret.copy_from_slice(&digest);
    Ok(BoxKeyPair::from_secret(secret))
}

fn shared_digest(
    q: &[u8; 32],
    client_pk: &[u8],
    server_pk: &[u8],
    outlen: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let mut state = GenericHashState::new(&[], outlen)?;
    state.update(q);
    state.update(client_pk);
    state.update(server_pk);
    Ok(Zeroizing::new(state.finalize()))
}

fn split(keys: &[u8], client: bool) -> SessionKeys {
    let mut first = [0u8; SESSION_KEY_SIZE];
    let mut second = [0u8; SESSION_KEY_SIZE];
    first.copy_from_slice(&keys[..32]);
    second.copy_from_slice(&keys[32..64]);
    if client {
        SessionKeys {
            rx: first,
            tx: second,
        }
    } else {
        SessionKeys {
            rx: second,
            tx: first,
        }
    }
}

/// `crypto_kx_client_session_keys`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] for a low-order server key, or
/// a length error.
pub fn client_session_keys(
    client_pk: &[u8],
    client_sk: &[u8],
    server_pk: &[u8],
) -> Result<SessionKeys, CryptoError> {
    fixed_array::<PUBLIC_KEY_SIZE>("public key", client_pk)?;
    let client_sk = key_array::<SECRET_KEY_SIZE>(client_sk)?;
    let q = Zeroizing::new(scalarmult(client_sk, server_pk)?);
    let keys = shared_digest(&q, client_pk, server_pk, 64)?;
    Ok(split(&keys, true))
}

/// `crypto_kx_server_session_keys`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] for a low-order client key, or
/// a length error.
pub fn server_session_keys(
    server_pk: &[u8],
    server_sk: &[u8],
    client_pk: &[u8],
) -> Result<SessionKeys, CryptoError> {
    fixed_array::<PUBLIC_KEY_SIZE>("public key", server_pk)?;
    let server_sk = key_array::<SECRET_KEY_SIZE>(server_sk)?;
    let q = Zeroizing::new(scalarmult(server_sk, client_pk)?);
    let keys = shared_digest(&q, client_pk, server_pk, 64)?;
    Ok(split(&keys, false))
}

/// Legacy `crypto_kx`: BLAKE2b-256(q ‖ client_pk ‖ server_pk) where
/// `q = X25519(my_sk, their_pk)`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] for a low-order peer key, or a
/// length error.
pub fn kx(
    my_sk: &[u8],
    their_pk: &[u8],
    client_pk: &[u8],
    server_pk: &[u8],
) -> Result<Zeroizing<[u8; SESSION_KEY_SIZE]>, CryptoError> {
    fixed_array::<PUBLIC_KEY_SIZE>("client public key", client_pk)?;
    fixed_array::<PUBLIC_KEY_SIZE>("server public key", server_pk)?;
    let q = Zeroizing::new(scalarmult(my_sk, their_pk)?);
    let digest = shared_digest(&q, client_pk, server_pk, SESSION_KEY_SIZE)?;
    let mut out = Zeroizing::new([0u8; SESSION_KEY_SIZE]);
    out.copy_from_slice(&digest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn test_seed_keypair_vector() {
        let client = seed_keypair(&[1u8; 32]).unwrap();
        assert_eq!(
            client.secret().to_vec(),
            h("f40ceaf86e5776923332b8d8fd3bef849cadb19c6996bc272af1f648d9566a4c")
        );
        assert_eq!(
            client.public().to_vec(),
            h("ab2fca32898322c208fb2dab5048bd43c355c6430f588897cb574961cfa9806f")
        );
    }

    #[test]
    fn test_session_keys_vector() {
        let client = seed_keypair(&[1u8; 32]).unwrap();
        let server = seed_keypair(&[2u8; 32]).unwrap();

        let c = client_session_keys(client.public(), client.secret(), server.public()).unwrap();
        let s = server_session_keys(server.public(), server.secret(), client.public()).unwrap();

        assert_eq!(
            c.rx().to_vec(),
            h("e0f480d42cd0d8a95993dd50976fb24ef81a6788b7b5bc722fc258410ac723ed")
        );
        assert_eq!(
            c.tx().to_vec(),
            h("43eb74c847209a3af513e0fc824b791865665dcc727fc332f4ddfc614e0ab79a")
        );
        assert_eq!(c.rx(), s.tx());
        assert_eq!(c.tx(), s.rx());
    }

    #[test]
    fn test_legacy_kx_agrees() {
        let client = seed_keypair(&[1u8; 32]).unwrap();
        let server = seed_keypair(&[2u8; 32]).unwrap();
        let a = kx(client.secret(), server.public(), client.public(), server.public()).unwrap();
        let b = kx(server.secret(), client.public(), client.public(), server.public()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.to_vec(),
            h("3f1fcf0e442f77882c45c1ee58b23e06e53e5cec112293a8a4981bc9c8acb009")
        );
    }

    #[test]
    fn test_low_order_peer_rejected() {
        let client = keypair().unwrap();
        assert_eq!(
            client_session_keys(client.public(), client.secret(), &[0u8; 32]).unwrap_err(),
            CryptoError::InvalidPublicKey
        );
        assert!(seed_keypair(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_debug_redacts() {
        let client = keypair().unwrap();
        let server = keypair().unwrap();
        let keys = client_session_keys(client.public(), client.secret(), server.public()).unwrap();
        assert_eq!(format!("{keys:?}"), "SessionKeys([REDACTED])");
    }
}
