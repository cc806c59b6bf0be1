//! Fuzz target for secretbox and box opening
//!
//! Tests that arbitrary boxes and keypairs are rejected without panicking.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use natrium_compat::Sodium;

#[derive(Debug, Arbitrary)]
struct OpenInput {
    key: Vec<u8>,
    nonce: Vec<u8>,
    boxed: Vec<u8>,
}

fuzz_target!(|input: OpenInput| {
    let sodium = Sodium::new();

    let _ = sodium.crypto_secretbox_open(&input.boxed, &input.nonce, &input.key);
    let _ = sodium.crypto_secretbox_xchacha20poly1305_open(&input.boxed, &input.nonce, &input.key);
    let _ = sodium.crypto_box_open(&input.boxed, &input.nonce, &input.key);
    let _ = sodium.crypto_box_seal_open(&input.boxed, &input.key);
});
