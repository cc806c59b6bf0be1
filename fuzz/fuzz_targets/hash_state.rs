//! Fuzz target for restoring serialised BLAKE2b contexts

#![no_main]

use libfuzzer_sys::fuzz_target;
use natrium_compat::Sodium;

fuzz_target!(|data: &[u8]| {
    let sodium = Sodium::new();
    let mut ctx = data.to_vec();
    ctx.resize(384, 0);

    if sodium.crypto_generichash_update(&mut ctx, data).is_ok() {
        let _ = sodium.crypto_generichash_final(&mut ctx, 32);
    }
});
