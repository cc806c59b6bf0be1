//! Secret-key authenticated encryption (`crypto_secretbox`).
//!
//! XSalsa20-Poly1305 by default, with an XChaCha20-Poly1305 variant. The
//! first 32 bytes of keystream become the one-time Poly1305 key and the
//! message is encrypted from byte 32 onward. Combined output is
//! `tag ‖ ciphertext`.

use zeroize::Zeroizing;

use crate::CryptoError;
use crate::constant_time::verify_16;
use crate::error::{fixed_array, key_array, nonce_array};
use crate::poly1305;
use crate::random::random_32;
use crate::stream::ChaCha20;
use crate::stream::salsa20::xsalsa20_apply;

/// Secretbox key size.
pub const KEY_SIZE: usize = 32;

/// Secretbox nonce size.
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size.
pub const MAC_SIZE: usize = 16;

/// Bytes of keystream consumed by the Poly1305 key.
const ZERO_BYTES: usize = 32;

/// Keystream flavour under a secretbox construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cipher {
    XSalsa20,
    XChaCha20,
}

impl Cipher {
    fn apply(
        self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        buf: &mut [u8],
    ) -> Result<(), CryptoError> {
        match self {
            Self::XSalsa20 => {
                xsalsa20_apply(key, nonce, 0, buf);
                Ok(())
            }
            Self::XChaCha20 => ChaCha20::new_x(key, nonce, 0).apply_keystream(buf),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::XSalsa20 => "secretbox",
            Self::XChaCha20 => "secretbox_xchacha20poly1305",
        }
    }

    fn seal_detached(
        self,
        message: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<(Vec<u8>, [u8; MAC_SIZE]), CryptoError> {
        let key = key_array::<KEY_SIZE>(key)?;
        let nonce = nonce_array::<NONCE_SIZE>(nonce)?;

        let mut buf = Zeroizing::new(vec![0u8; ZERO_BYTES + message.len()]);
        buf[ZERO_BYTES..].copy_from_slice(message);
        self.apply(key, nonce, &mut buf)?;

        let poly_key: &[u8; ZERO_BYTES] = fixed_array("poly1305 key", &buf[..ZERO_BYTES])?;
        let tag = poly1305::tag(&buf[ZERO_BYTES..], poly_key);
        Ok((buf[ZERO_BYTES..].to_vec(), tag))
    }

    fn open_detached(
        self,
        ciphertext: &[u8],
        mac: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mac = fixed_array::<MAC_SIZE>("mac", mac)?;
        let key = key_array::<KEY_SIZE>(key)?;
        let nonce = nonce_array::<NONCE_SIZE>(nonce)?;

        let mut poly_key = Zeroizing::new([0u8; ZERO_BYTES]);
        self.apply(key, nonce, &mut poly_key[..])?;
        if !verify_16(mac, &poly1305::tag(ciphertext, &poly_key)) {
            tracing::debug!(
                operation = self.name(),
                len = ciphertext.len(),
                "authentication failed"
            );
            return Err(CryptoError::AuthenticationFailed);
        }

        let mut buf = Zeroizing::new(vec![0u8; ZERO_BYTES + ciphertext.len()]);
        buf[ZERO_BYTES..].copy_from_slice(ciphertext);
        self.apply(key, nonce, &mut buf)?;
        Ok(buf[ZERO_BYTES..].to_vec())
    }

    fn seal(self, message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let (ct, tag) = self.seal_detached(message, nonce, key)?;
        let mut out = Vec::with_capacity(MAC_SIZE + ct.len());
        out.extend_from_slice(&tag);
        out.extend_from_slice(&ct);
        Ok(out)
    }

    fn open(self, boxed: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if boxed.len() < MAC_SIZE {
            return Err(CryptoError::length("ciphertext", MAC_SIZE, boxed.len()));
        }
        let (mac, ct) = boxed.split_at(MAC_SIZE);
        self.open_detached(ct, mac, nonce, key)
    }
}

/// Encrypt and authenticate `message`; returns `tag ‖ ciphertext`.
///
/// # Errors
///
/// Returns an error if the key is not 32 bytes or the nonce not 24.
pub fn secretbox(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Cipher::XSalsa20.seal(message, nonce, key)
}

/// Verify and decrypt a `tag ‖ ciphertext` box.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the tag does not
/// verify; no plaintext is released in that case.
pub fn secretbox_open(boxed: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Cipher::XSalsa20.open(boxed, nonce, key)
}

/// Encrypt `message`, returning `(ciphertext, tag)`.
///
/// # Errors
///
/// Returns an error if the key is not 32 bytes or the nonce not 24.
pub fn secretbox_detached(
    message: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Result<(Vec<u8>, [u8; MAC_SIZE]), CryptoError> {
    Cipher::XSalsa20.seal_detached(message, nonce, key)
}

/// Verify `mac` over `ciphertext` and decrypt.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the tag does not verify.
pub fn secretbox_open_detached(
    ciphertext: &[u8],
    mac: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    Cipher::XSalsa20.open_detached(ciphertext, mac, nonce, key)
}

/// XChaCha20-Poly1305 secretbox; returns `tag ‖ ciphertext`.
///
/// # Errors
///
/// Returns an error if the key is not 32 bytes or the nonce not 24.
pub fn secretbox_xchacha20poly1305(
    message: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    Cipher::XChaCha20.seal(message, nonce, key)
}

/// Open an XChaCha20-Poly1305 secretbox.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the tag does not verify.
pub fn secretbox_xchacha20poly1305_open(
    boxed: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    Cipher::XChaCha20.open(boxed, nonce, key)
}

/// Detached XChaCha20-Poly1305 secretbox.
///
/// # Errors
///
/// Returns an error if the key is not 32 bytes or the nonce not 24.
pub fn secretbox_xchacha20poly1305_detached(
    message: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Result<(Vec<u8>, [u8; MAC_SIZE]), CryptoError> {
    Cipher::XChaCha20.seal_detached(message, nonce, key)
}

/// Open a detached XChaCha20-Poly1305 secretbox.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] if the tag does not verify.
pub fn secretbox_xchacha20poly1305_open_detached(
    ciphertext: &[u8],
    mac: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    Cipher::XChaCha20.open_detached(ciphertext, mac, nonce, key)
}

/// Generate a random secretbox key.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn keygen() -> Result<[u8; KEY_SIZE], CryptoError> {
    random_32()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    // NaCl box test: firstkey, nonce and 131-byte message
    const KEY: &str = "1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389";
    const NONCE: &str = "69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37";
    const MESSAGE: &str = "be075fc53c81f2d5cf141316ebeb0c7b5228c52a4c62cbd44b66849b64244ffc\
        e5ecbaaf33bd751a1ac728d45e6c61296cdc3c01233561f41db66cce314adb31\
        0e3be8250c46f06dceea3a7fa1348057e2f6556ad6b1318a024a838f21af1fde\
        048977eb48f59ffd4924ca1c60902e52f0a089bc76897040e082f937763848645e0705";
    const BOXED: &str = "f3ffc7703f9400e52a7dfb4b3d3305d98e993b9f48681273c29650ba32fc76ce\
        48332ea7164d96a4476fb8c531a1186ac0dfc17c98dce87b4da7f011ec48c972\
        71d2c20f9b928fe2270d6fb863d51738b48eeee314a7cc8ab932164548e526ae\
        90224368517acfeabd6bb3732bc0e9da99832b61ca01b6de56244a9e88d5f9b3\
        7973f622a43d14a6599b1f654cb45a74e355a5";

    #[test]
    fn test_nacl_vector() {
        let boxed = secretbox(&h(MESSAGE), &h(NONCE), &h(KEY)).unwrap();
        assert_eq!(boxed, h(BOXED));
        assert_eq!(secretbox_open(&boxed, &h(NONCE), &h(KEY)).unwrap(), h(MESSAGE));
    }

    #[test]
    fn test_xchacha20poly1305_vector() {
        let key: Vec<u8> = (0u8..32).collect();
        let nonce: Vec<u8> = (0u8..24).collect();
        let boxed = secretbox_xchacha20poly1305(b"natrium secretbox", &nonce, &key).unwrap();
        assert_eq!(
            boxed,
            h("19d44d9983d19b42f43fe6f96d7a7ec6069a9a24a0b76119e56b3a2d5bd30ef8e0")
        );
        assert_eq!(
            secretbox_xchacha20poly1305_open(&boxed, &nonce, &key).unwrap(),
            b"natrium secretbox"
        );
    }

    #[test]
    fn test_tamper_detection() {
        let key = [0x33u8; 32];
        let nonce = [0x44u8; 24];
        let boxed = secretbox(b"attack at dawn", &nonce, &key).unwrap();

        for i in 0..boxed.len() {
            let mut tampered = boxed.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                secretbox_open(&tampered, &nonce, &key),
                Err(CryptoError::AuthenticationFailed),
                "flip at byte {i}"
            );
        }

        let mut wrong_nonce = nonce;
        wrong_nonce[23] ^= 1;
        assert!(secretbox_open(&boxed, &wrong_nonce, &key).is_err());
    }

    #[test]
    fn test_empty_message() {
        let key = [1u8; 32];
        let nonce = [2u8; 24];
        let boxed = secretbox(&[], &nonce, &key).unwrap();
        assert_eq!(boxed.len(), MAC_SIZE);
        assert!(secretbox_open(&boxed, &nonce, &key).unwrap().is_empty());
    }

    #[test]
    fn test_short_box_rejected() {
        assert!(matches!(
            secretbox_open(&[0u8; 15], &[0u8; 24], &[0u8; 32]),
            Err(CryptoError::InvalidLength { expected: 16, .. })
        ));
    }

    #[test]
    fn test_detached_matches_combined() {
        let key = keygen().unwrap();
        let nonce = [9u8; 24];
        let msg = vec![0x5au8; 200];

        let combined = secretbox(&msg, &nonce, &key).unwrap();
        let (ct, mac) = secretbox_detached(&msg, &nonce, &key).unwrap();
        assert_eq!(&combined[..16], &mac[..]);
        assert_eq!(&combined[16..], &ct[..]);
        assert_eq!(secretbox_open_detached(&ct, &mac, &nonce, &key).unwrap(), msg);

        let (xct, xmac) = secretbox_xchacha20poly1305_detached(&msg, &nonce, &key).unwrap();
        assert_ne!(xct, ct);
        assert_eq!(
            secretbox_xchacha20poly1305_open_detached(&xct, &xmac, &nonce, &key).unwrap(),
            msg
        );
    }

    #[test]
    fn test_length_validation() {
        assert!(matches!(
            secretbox(b"m", &[0u8; 12], &[0u8; 32]),
            Err(CryptoError::InvalidNonceLength {
                expected: 24,
                actual: 12
            })
        ));
        assert!(matches!(
            secretbox(b"m", &[0u8; 24], &[0u8; 16]),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
    }
}
