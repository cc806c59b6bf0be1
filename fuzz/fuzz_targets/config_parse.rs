//! Fuzz test for configuration file parsing
//!
//! Arbitrary TOML must either load as a configuration or fail cleanly.

#![no_main]

use libfuzzer_sys::fuzz_target;
use natrium_compat::CompatConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<CompatConfig>(s) {
            let _ = config.validate();
        }
    }
});
