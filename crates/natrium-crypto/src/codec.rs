//! Hex and base64 codecs.
//!
//! The hex codec avoids table lookups and data-dependent branches on the
//! byte values, so it can encode keys. Base64 is delegated to the `base64`
//! crate with the four libsodium variants.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::CryptoError;

/// `sodium_bin2hex`: lowercase hex encoding.
#[must_use]
pub fn bin2hex(bin: &[u8]) -> String {
    let mut hex = String::with_capacity(bin.len() * 2);
    for &byte in bin {
        let c = u32::from(byte & 0x0f);
        let b = u32::from(byte >> 4);
        let lo = 87 + c + (c.wrapping_sub(10) >> 8 & !38);
        let hi = 87 + b + (b.wrapping_sub(10) >> 8 & !38);
        hex.push(char::from(hi as u8));
        hex.push(char::from(lo as u8));
    }
    hex
}

/// `sodium_hex2bin`: decode hex, skipping any characters in `ignore`
/// between byte pairs.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEncoding`] on a character that is neither
/// a hex digit nor ignorable, or on an odd number of digits.
pub fn hex2bin(hex: &str, ignore: &str) -> Result<Vec<u8>, CryptoError> {
    let mut bin = Vec::with_capacity(hex.len() / 2);
    let mut acc: u8 = 0;
    let mut high = true;

    for (pos, c) in hex.bytes().enumerate() {
        let c = u32::from(c);
        let c_num = c ^ 48;
        let c_num0 = c_num.wrapping_sub(10) >> 8;
        let c_alpha = (c & !32).wrapping_sub(55);
        let c_alpha0 = (c_alpha.wrapping_sub(10) ^ c_alpha.wrapping_sub(16)) >> 8;

        if (c_num0 | c_alpha0) & 0xff == 0 {
            if high && ignore.as_bytes().contains(&(c as u8)) {
                continue;
            }
            return Err(CryptoError::InvalidEncoding(format!(
                "invalid hex character at offset {pos}"
            )));
        }

        let val = ((c_num0 & c_num) | (c_alpha0 & c_alpha)) as u8;
        if high {
            acc = val << 4;
        } else {
            bin.push(acc | val);
        }
        high = !high;
    }

    if !high {
        return Err(CryptoError::InvalidEncoding(
            "odd number of hex digits".to_string(),
        ));
    }
    Ok(bin)
}

/// Base64 alphabet and padding, numbered as in libsodium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base64Variant {
    /// `+/` with `=` padding
    #[default]
    Original = 1,
    /// `+/` without padding
    OriginalNoPadding = 3,
    /// `-_` with `=` padding
    UrlSafe = 5,
    /// `-_` without padding
    UrlSafeNoPadding = 7,
}

impl Base64Variant {
    /// Map libsodium's numeric variant identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameter`] for unknown identifiers.
    pub fn from_id(id: u32) -> Result<Self, CryptoError> {
        match id {
            1 => Ok(Self::Original),
            3 => Ok(Self::OriginalNoPadding),
            5 => Ok(Self::UrlSafe),
            7 => Ok(Self::UrlSafeNoPadding),
            other => Err(CryptoError::InvalidParameter(format!(
                "unknown base64 variant {other}"
            ))),
        }
    }

    fn engine(self) -> &'static base64::engine::GeneralPurpose {
        match self {
            Self::Original => &STANDARD,
            Self::OriginalNoPadding => &STANDARD_NO_PAD,
            Self::UrlSafe => &URL_SAFE,
            Self::UrlSafeNoPadding => &URL_SAFE_NO_PAD,
        }
    }
}

/// `sodium_bin2base64`.
#[must_use]
pub fn bin2base64(bin: &[u8], variant: Base64Variant) -> String {
    variant.engine().encode(bin)
}

/// `sodium_base642bin`: decode base64, skipping characters in `ignore`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEncoding`] if the input is not valid for
/// the variant, including missing or unexpected padding.
pub fn base642bin(b64: &str, ignore: &str, variant: Base64Variant) -> Result<Vec<u8>, CryptoError> {
    let filtered: String = b64.chars().filter(|c| !ignore.contains(*c)).collect();
    variant
        .engine()
        .decode(filtered.as_bytes())
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}
