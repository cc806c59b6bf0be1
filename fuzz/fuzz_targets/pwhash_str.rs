//! Fuzz target for password hash string parsing
//!
//! Only the parsers are exercised; verification would run the hash at
//! whatever cost the input claims.

#![no_main]

use libfuzzer_sys::fuzz_target;
use natrium_crypto::pwhash;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = pwhash::pwhash_str_needs_rehash(s, pwhash::OPSLIMIT_INTERACTIVE, pwhash::MEMLIMIT_INTERACTIVE);
        let _ = pwhash::pwhash_scryptsalsa208sha256_str_needs_rehash(
            s,
            pwhash::scrypt::OPSLIMIT_INTERACTIVE,
            pwhash::scrypt::MEMLIMIT_INTERACTIVE,
        );
    }
});
