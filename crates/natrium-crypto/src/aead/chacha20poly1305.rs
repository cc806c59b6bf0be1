//! ChaCha20-Poly1305 in its three libsodium flavours.
//!
//! | Flavour | Nonce | MAC input |
//! |---------|-------|-----------|
//! | original | 8 bytes | `ad ‖ le64(adlen) ‖ ct ‖ le64(ctlen)` |
//! | IETF (RFC 8439) | 12 bytes | `ad ‖ pad16 ‖ ct ‖ pad16 ‖ le64(adlen) ‖ le64(ctlen)` |
//! | XChaCha20 IETF | 24 bytes | as IETF, under an HChaCha20 subkey |
//!
//! In every flavour block 0 of the keystream supplies the Poly1305 key and
//! the message is encrypted from block 1. Combined output is
//! `ciphertext ‖ tag`.

use zeroize::Zeroizing;

use crate::CryptoError;
use crate::constant_time::verify_16;
use crate::error::{fixed_array, key_array, nonce_array};
use crate::poly1305::Poly1305;
use crate::random::random_32;
use crate::stream::ChaCha20;
use crate::stream::chacha20::xchacha20_subkey;

/// Key size shared by all flavours.
pub const KEY_SIZE: usize = 32;

/// Original-flavour nonce size.
pub const NONCE_SIZE: usize = 8;

/// IETF-flavour nonce size.
pub const IETF_NONCE_SIZE: usize = 12;

/// XChaCha20 IETF nonce size.
pub const XNONCE_SIZE: usize = 24;

/// Authentication tag size.
pub const TAG_SIZE: usize = 16;

const PAD: [u8; 16] = [0u8; 16];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavour {
    Original,
    Ietf,
    XChaChaIetf,
}

impl Flavour {
    fn name(self) -> &'static str {
        match self {
            Self::Original => "aead_chacha20poly1305",
            Self::Ietf => "aead_chacha20poly1305_ietf",
            Self::XChaChaIetf => "aead_xchacha20poly1305_ietf",
        }
    }

    /// Build a keystream positioned at block 0 for this flavour.
    fn cipher(self, key: &[u8], nonce: &[u8]) -> Result<ChaCha20, CryptoError> {
        let key = key_array::<KEY_SIZE>(key)?;
        match self {
            Self::Original => Ok(ChaCha20::new(key, nonce_array(nonce)?, 0)),
            Self::Ietf => Ok(ChaCha20::new_ietf(key, nonce_array(nonce)?, 0)),
            Self::XChaChaIetf => {
                let nonce = nonce_array::<XNONCE_SIZE>(nonce)?;
                let subkey = xchacha20_subkey(key, nonce);
                let mut ietf_nonce = [0u8; IETF_NONCE_SIZE];
                ietf_nonce[4..].copy_from_slice(&nonce[16..]);
                Ok(ChaCha20::new_ietf(&subkey, &ietf_nonce, 0))
            }
        }
    }

    /// Consume block 0 as the Poly1305 key, leaving the cipher at block 1.
    fn poly_key(cipher: &mut ChaCha20) -> Poly1305 {
        let mut block0 = Zeroizing::new([0u8; 64]);
        cipher.next_block(&mut block0);
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&block0[..32]);
        Poly1305::new(&key)
    }

    fn compute_tag(self, mut mac: Poly1305, ad: &[u8], ciphertext: &[u8]) -> [u8; TAG_SIZE] {
        let ad_len = (ad.len() as u64).to_le_bytes();
        let ct_len = (ciphertext.len() as u64).to_le_bytes();
        match self {
            Self::Original => {
                mac.update(ad);
                mac.update(&ad_len);
                mac.update(ciphertext);
                mac.update(&ct_len);
            }
            Self::Ietf | Self::XChaChaIetf => {
                mac.update(ad);
                mac.update(&PAD[..(16 - ad.len() % 16) % 16]);
                mac.update(ciphertext);
                mac.update(&PAD[..(16 - ciphertext.len() % 16) % 16]);
                mac.update(&ad_len);
                mac.update(&ct_len);
            }
        }
        mac.finalize()
    }

    fn encrypt_detached(
        self,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<(Vec<u8>, [u8; TAG_SIZE]), CryptoError> {
        let mut cipher = self.cipher(key, nonce)?;
        let mac = Self::poly_key(&mut cipher);

        let mut ciphertext = message.to_vec();
        cipher.apply_keystream(&mut ciphertext)?;
        let tag = self.compute_tag(mac, ad, &ciphertext);
        Ok((ciphertext, tag))
    }

    fn decrypt_detached(
        self,
        ciphertext: &[u8],
        tag: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let tag = fixed_array::<TAG_SIZE>("tag", tag)?;
        let mut cipher = self.cipher(key, nonce)?;
        let mac = Self::poly_key(&mut cipher);

        if !verify_16(tag, &self.compute_tag(mac, ad, ciphertext)) {
            tracing::debug!(
                operation = self.name(),
                len = ciphertext.len(),
                ad_len = ad.len(),
                "authentication failed"
            );
            return Err(CryptoError::AuthenticationFailed);
        }

        let mut plaintext = ciphertext.to_vec();
        cipher.apply_keystream(&mut plaintext)?;
        Ok(plaintext)
    }

    fn encrypt(
        self,
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let (mut out, tag) = self.encrypt_detached(message, ad, nonce, key)?;
        out.extend_from_slice(&tag);
        Ok(out)
    }

    fn decrypt(
        self,
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::length("ciphertext", TAG_SIZE, ciphertext.len()));
        }
        let (ct, tag) = ciphertext.split_at(ciphertext.len() - TAG_SIZE);
        self.decrypt_detached(ct, tag, ad, nonce, key)
    }
}

macro_rules! aead_flavour {
    (
        $flavour:expr,
        $nonce_doc:literal,
        $encrypt:ident,
        $decrypt:ident,
        $encrypt_detached:ident,
        $decrypt_detached:ident
    ) => {
        #[doc = concat!("Encrypt with a ", $nonce_doc, " nonce; returns `ciphertext ‖ tag`.")]
        ///
        /// # Errors
        ///
        /// Returns an error on bad key or nonce lengths, or if the message
        /// exceeds the keystream of the flavour.
        pub fn $encrypt(
            message: &[u8],
            ad: &[u8],
            nonce: &[u8],
            key: &[u8],
        ) -> Result<Vec<u8>, CryptoError> {
            $flavour.encrypt(message, ad, nonce, key)
        }

        #[doc = concat!("Verify and decrypt `ciphertext ‖ tag` under a ", $nonce_doc, " nonce.")]
        ///
        /// # Errors
        ///
        /// Returns [`CryptoError::AuthenticationFailed`] if the tag does not
        /// verify; no plaintext is released in that case.
        pub fn $decrypt(
            ciphertext: &[u8],
            ad: &[u8],
            nonce: &[u8],
            key: &[u8],
        ) -> Result<Vec<u8>, CryptoError> {
            $flavour.decrypt(ciphertext, ad, nonce, key)
        }

        #[doc = concat!("Detached encryption with a ", $nonce_doc, " nonce.")]
        ///
        /// # Errors
        ///
        /// Returns an error on bad key or nonce lengths.
        pub fn $encrypt_detached(
            message: &[u8],
            ad: &[u8],
            nonce: &[u8],
            key: &[u8],
        ) -> Result<(Vec<u8>, [u8; TAG_SIZE]), CryptoError> {
            $flavour.encrypt_detached(message, ad, nonce, key)
        }

        #[doc = concat!("Detached decryption with a ", $nonce_doc, " nonce.")]
        ///
        /// # Errors
        ///
        /// Returns [`CryptoError::AuthenticationFailed`] if the tag does not verify.
        pub fn $decrypt_detached(
            ciphertext: &[u8],
            tag: &[u8],
            ad: &[u8],
            nonce: &[u8],
            key: &[u8],
        ) -> Result<Vec<u8>, CryptoError> {
            $flavour.decrypt_detached(ciphertext, tag, ad, nonce, key)
        }
    };
}

aead_flavour!(
    Flavour::Original,
    "8-byte",
    chacha20poly1305_encrypt,
    chacha20poly1305_decrypt,
    chacha20poly1305_encrypt_detached,
    chacha20poly1305_decrypt_detached
);

aead_flavour!(
    Flavour::Ietf,
    "12-byte IETF",
    chacha20poly1305_ietf_encrypt,
    chacha20poly1305_ietf_decrypt,
    chacha20poly1305_ietf_encrypt_detached,
    chacha20poly1305_ietf_decrypt_detached
);

aead_flavour!(
    Flavour::XChaChaIetf,
    "24-byte XChaCha20",
    xchacha20poly1305_ietf_encrypt,
    xchacha20poly1305_ietf_decrypt,
    xchacha20poly1305_ietf_encrypt_detached,
    xchacha20poly1305_ietf_decrypt_detached
);

/// Generate a random AEAD key.
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

    const SUNSCREEN: &[u8] = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";
    const RFC_KEY: &str = "808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f";
    const RFC_AD: &str = "50515253c0c1c2c3c4c5c6c7";

    #[test]
    fn test_ietf_rfc8439_vector() {
        let nonce = h("070000004041424344454647");
        let out =
            chacha20poly1305_ietf_encrypt(SUNSCREEN, &h(RFC_AD), &nonce, &h(RFC_KEY)).unwrap();
        assert_eq!(
            out,
            h("d31a8d34648e60db7b86afbc53ef7ec2a4aded51296e08fea9e2b5a736ee62d6\
               3dbea45e8ca9671282fafb69da92728b1a71de0a9e060b2905d6a5b67ecd3b36\
               92ddbd7f2d778b8c9803aee328091b58fab324e4fad675945585808b4831d7bc\
               3ff4def08e4b7a9de576d26586cec64b6116\
               1ae10b594f09e26a7e902ecbd0600691")
        );
        assert_eq!(
            chacha20poly1305_ietf_decrypt(&out, &h(RFC_AD), &nonce, &h(RFC_KEY)).unwrap(),
            SUNSCREEN
        );
    }

    #[test]
    fn test_xchacha20poly1305_ietf_vector() {
        let nonce = h("404142434445464748494a4b4c4d4e4f5051525354555657");
        let out =
            xchacha20poly1305_ietf_encrypt(SUNSCREEN, &h(RFC_AD), &nonce, &h(RFC_KEY)).unwrap();
        assert_eq!(
            out,
            h("bd6d179d3e83d43b9576579493c0e939572a1700252bfaccbed2902c21396cbb\
               731c7f1b0b4aa6440bf3a82f4eda7e39ae64c6708c54c216cb96b72e1213b452\
               2f8c9ba40db5d945b11b69b982c1bb9e3f3fac2bc369488f76b2383565d3fff9\
               21f9664c97637da9768812f615c68b13b52e\
               c0875924c1c7987947deafd8780acf49")
        );
    }

    #[test]
    fn test_original_vectors() {
        let key: Vec<u8> = (0u8..32).collect();
        let nonce = h("0102030405060708");
        let out = chacha20poly1305_encrypt(b"natrium", b"header", &nonce, &key).unwrap();
        assert_eq!(out, h("8187d18accf9c51dd4a0e3fb244073db8ef10c5c70a44d"));
        assert_eq!(
            chacha20poly1305_decrypt(&out, b"header", &nonce, &key).unwrap(),
            b"natrium"
        );

        let empty = chacha20poly1305_encrypt(&[], &[], &[0u8; 8], &[0u8; 32]).unwrap();
        assert_eq!(empty, h("4eb972c9a8fb3a1b382bb4d36f5ffad1"));
    }

    #[test]
    fn test_ad_is_authenticated() {
        let key = keygen().unwrap();
        let nonce = [3u8; 12];
        let ct = chacha20poly1305_ietf_encrypt(b"payload", b"ad-1", &nonce, &key).unwrap();
        assert_eq!(
            chacha20poly1305_ietf_decrypt(&ct, b"ad-2", &nonce, &key),
            Err(CryptoError::AuthenticationFailed)
        );
        assert_eq!(
            chacha20poly1305_ietf_decrypt(&ct, b"", &nonce, &key),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_tamper_each_byte() {
        let key = [0x21u8; 32];
        let nonce = [0x12u8; 24];
        let ct = xchacha20poly1305_ietf_encrypt(b"sixteen byte msg", b"ad", &nonce, &key).unwrap();
        for i in 0..ct.len() {
            let mut bad = ct.clone();
            bad[i] ^= 0x80;
            assert!(xchacha20poly1305_ietf_decrypt(&bad, b"ad", &nonce, &key).is_err());
        }
    }

    #[test]
    fn test_flavours_differ() {
        // same key, nonce prefix and message; MAC layouts must not collide
        let key = [0x55u8; 32];
        let orig = chacha20poly1305_encrypt(b"msg", b"ad", &[0u8; 8], &key).unwrap();
        let ietf = chacha20poly1305_ietf_encrypt(b"msg", b"ad", &[0u8; 12], &key).unwrap();
        assert_eq!(&orig[..3], &ietf[..3]);
        assert_ne!(&orig[3..], &ietf[3..]);
    }

    #[test]
    fn test_detached_roundtrip() {
        let key = [0x77u8; 32];
        let nonce = [0x01u8; 8];
        let (ct, tag) = chacha20poly1305_encrypt_detached(b"detached", b"", &nonce, &key).unwrap();
        assert_eq!(
            chacha20poly1305_decrypt_detached(&ct, &tag, b"", &nonce, &key).unwrap(),
            b"detached"
        );
        assert!(chacha20poly1305_decrypt_detached(&ct, &tag[..8], b"", &nonce, &key).is_err());
    }

    #[test]
    fn test_short_ciphertext() {
        assert!(matches!(
            xchacha20poly1305_ietf_decrypt(&[0u8; 15], &[], &[0u8; 24], &[0u8; 32]),
            Err(CryptoError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_nonce_length_per_flavour() {
        let key = [0u8; 32];
        assert!(chacha20poly1305_encrypt(b"m", b"", &[0u8; 12], &key).is_err());
        assert!(chacha20poly1305_ietf_encrypt(b"m", b"", &[0u8; 8], &key).is_err());
        assert!(xchacha20poly1305_ietf_encrypt(b"m", b"", &[0u8; 12], &key).is_err());
    }
}
