//! Zeroization validation tests
//!
//! Key-holding types derive `Zeroize` and `ZeroizeOnDrop`; these tests wipe
//! them explicitly and check the observable bytes, and check that secret
//! return values come wrapped in `Zeroizing`.

use natrium_crypto::aead;
use natrium_crypto::box_::{self, BoxKeyPair};
use natrium_crypto::constant_time::memzero;
use natrium_crypto::generichash::GenericHashState;
use natrium_crypto::kx;
use natrium_crypto::sign::{self, SignKeyPair};
use zeroize::{Zeroize, Zeroizing};

fn is_zeroed(data: &[u8]) -> bool {
    data.iter().all(|&b| b == 0)
}

#[test]
fn test_box_keypair_zeroize() {
    let mut pair = BoxKeyPair::from_secret([0x42; 32]);
    assert!(!is_zeroed(pair.secret()));
    pair.zeroize();
    assert!(is_zeroed(pair.secret()));
    // the public half is not secret and survives
    assert!(!is_zeroed(pair.public()));
}

#[test]
fn test_sign_keypair_zeroize() {
    let mut pair = SignKeyPair::from_seed(&[7u8; 32]);
    pair.zeroize();
    assert!(is_zeroed(pair.secret()));
}

#[test]
fn test_session_keys_zeroize() {
    let client = kx::keypair().unwrap();
    let server = kx::keypair().unwrap();
    let mut keys =
        kx::client_session_keys(client.public(), client.secret(), server.public()).unwrap();
    assert!(!is_zeroed(keys.rx()));
    keys.zeroize();
    assert!(is_zeroed(keys.rx()));
    assert!(is_zeroed(keys.tx()));
}

#[test]
fn test_generichash_state_zeroize() {
    let mut state = GenericHashState::new(b"secret key", 32).unwrap();
    state.update(b"buffered input that has not been compressed");
    state.zeroize();
    assert!(is_zeroed(&state.to_bytes()[..]));
    assert_eq!(state.output_len(), 0);
}

#[test]
fn test_aead_key_zeroization() {
    let mut key = Zeroizing::new(aead::keygen().unwrap());
    assert!(!is_zeroed(&key[..]));
    key.zeroize();
    assert!(is_zeroed(&key[..]));
}

#[test]
fn test_memzero() {
    let mut buf = *b"password material";
    memzero(&mut buf);
    assert!(is_zeroed(&buf));
}

#[test]
fn test_secret_outputs_are_wrapped() {
    // compile-time check that secret-bearing results are Zeroizing
    let pair = sign::keypair().unwrap();
    let _: Zeroizing<[u8; 32]> = sign::sk_to_seed(pair.secret()).unwrap();
    let _: Zeroizing<[u8; 32]> = sign::sk_to_curve25519(pair.secret()).unwrap();

    let alice = box_::keypair().unwrap();
    let bob = box_::keypair().unwrap();
    let _: Zeroizing<[u8; 32]> = box_::beforenm(bob.public(), alice.secret()).unwrap();
    let _: Zeroizing<[u8; 64]> = alice.to_bytes();
}
