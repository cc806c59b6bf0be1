//! Fuzz target for Ed25519 verification and point decoding

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use natrium_crypto::sign;

#[derive(Debug, Arbitrary)]
struct VerifyInput {
    public: [u8; 32],
    signature: [u8; 64],
    message: Vec<u8>,
}

fuzz_target!(|input: VerifyInput| {
    let _ = sign::verify_detached(&input.signature, &input.message, &input.public);
    let _ = sign::pk_to_curve25519(&input.public);

    let mut signed = input.signature.to_vec();
    signed.extend_from_slice(&input.message);
    let _ = sign::open(&signed, &input.public);
});
