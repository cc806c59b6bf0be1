//! Fuzz target for the ChaCha20-Poly1305 constructions
//!
//! Encryption must round-trip and decryption of arbitrary bytes must fail
//! cleanly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use natrium_crypto::aead;

#[derive(Debug, Arbitrary)]
struct AeadInput {
    key: [u8; 32],
    nonce: [u8; 24],
    flavour: u8,
    plaintext: Vec<u8>,
    aad: Vec<u8>,
}

fuzz_target!(|input: AeadInput| {
    let (nonce, encrypt, decrypt): (&[u8], _, _) = match input.flavour % 3 {
        0 => (
            &input.nonce[..8],
            aead::chacha20poly1305_encrypt as fn(&[u8], &[u8], &[u8], &[u8]) -> _,
            aead::chacha20poly1305_decrypt as fn(&[u8], &[u8], &[u8], &[u8]) -> _,
        ),
        1 => (
            &input.nonce[..12],
            aead::chacha20poly1305_ietf_encrypt,
            aead::chacha20poly1305_ietf_decrypt,
        ),
        _ => (
            &input.nonce[..],
            aead::xchacha20poly1305_ietf_encrypt,
            aead::xchacha20poly1305_ietf_decrypt,
        ),
    };

    if let Ok(ciphertext) = encrypt(&input.plaintext, &input.aad, nonce, &input.key) {
        let opened = decrypt(&ciphertext, &input.aad, nonce, &input.key);
        assert_eq!(opened.ok().as_deref(), Some(&input.plaintext[..]));
    }

    // Arbitrary ciphertext must be rejected without panicking
    let _ = decrypt(&input.plaintext, &input.aad, nonce, &input.key);
});
