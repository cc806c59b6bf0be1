//! Fuzz target for the hex and base64 decoders

#![no_main]

use libfuzzer_sys::fuzz_target;
use natrium_crypto::codec::{self, Base64Variant};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(bin) = codec::hex2bin(s, ": ") {
        assert_eq!(codec::hex2bin(&codec::bin2hex(&bin), "").ok(), Some(bin));
    }

    for id in [1, 3, 5, 7] {
        let Ok(variant) = Base64Variant::from_id(id) else {
            continue;
        };
        if let Ok(bin) = codec::base642bin(s, "\n", variant) {
            let encoded = codec::bin2base64(&bin, variant);
            assert_eq!(codec::base642bin(&encoded, "", variant).ok(), Some(bin));
        }
    }
});
