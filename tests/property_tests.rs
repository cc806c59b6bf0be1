//! Property-based tests for Natrium
//!
//! Uses proptest to verify invariants across large input spaces.

use proptest::prelude::*;

// ============================================================================
// Stream Cipher Properties
// ============================================================================

mod stream_properties {
    use super::*;
    use natrium_crypto::stream;

    proptest! {
        /// XSalsa20: applying the keystream twice is the identity
        #[test]
        fn xsalsa20_involution(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            message in prop::collection::vec(any::<u8>(), 0..512),
        ) {
            let ct = stream::stream_xor(&message, &nonce, &key).unwrap();
            prop_assert_eq!(stream::stream_xor(&ct, &nonce, &key).unwrap(), message);
        }

        /// XChaCha20 involution
        #[test]
        fn xchacha20_involution(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            message in prop::collection::vec(any::<u8>(), 0..512),
        ) {
            let ct = stream::xchacha20_xor(&message, &nonce, &key).unwrap();
            prop_assert_eq!(stream::xchacha20_xor(&ct, &nonce, &key).unwrap(), message);
        }

        /// Starting at block `ic` matches skipping `ic` blocks of the full stream
        #[test]
        fn chacha20_ietf_counter_offset(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 12]>(),
            ic in 0u32..4,
            len in 0usize..256,
        ) {
            let full = stream::chacha20_ietf(len + 64 * ic as usize, &nonce, &key).unwrap();
            let tail = stream::chacha20_ietf_xor_ic(&vec![0u8; len], &nonce, ic, &key).unwrap();
            prop_assert_eq!(&full[64 * ic as usize..], &tail[..]);
        }
    }
}

// ============================================================================
// AEAD Properties
// ============================================================================

mod aead_properties {
    use super::*;
    use natrium_crypto::{aead, secretbox};

    type Encrypt = fn(&[u8], &[u8], &[u8], &[u8]) -> Result<Vec<u8>, natrium_crypto::CryptoError>;
    type Decrypt = Encrypt;

    fn flavours() -> [(usize, Encrypt, Decrypt); 3] {
        [
            (8, aead::chacha20poly1305_encrypt, aead::chacha20poly1305_decrypt),
            (12, aead::chacha20poly1305_ietf_encrypt, aead::chacha20poly1305_ietf_decrypt),
            (24, aead::xchacha20poly1305_ietf_encrypt, aead::xchacha20poly1305_ietf_decrypt),
        ]
    }

    proptest! {
        /// Encrypt then decrypt recovers the plaintext for every construction
        #[test]
        fn aead_roundtrip(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..512),
            aad in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            for (nonce_len, encrypt, decrypt) in flavours() {
                let nonce = &nonce[..nonce_len];
                let ct = encrypt(&plaintext, &aad, nonce, &key).unwrap();
                prop_assert_eq!(ct.len(), plaintext.len() + aead::TAG_SIZE);
                prop_assert_eq!(decrypt(&ct, &aad, nonce, &key).unwrap(), plaintext.clone());
            }
        }

        /// Any single flipped bit in ciphertext or tag is rejected
        #[test]
        fn aead_bit_flip_rejected(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
            aad in prop::collection::vec(any::<u8>(), 0..32),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            for (nonce_len, encrypt, decrypt) in flavours() {
                let nonce = &nonce[..nonce_len];
                let mut ct = encrypt(&plaintext, &aad, nonce, &key).unwrap();
                let i = position.index(ct.len());
                ct[i] ^= 1 << bit;
                prop_assert!(decrypt(&ct, &aad, nonce, &key).is_err());
            }
        }

        /// Any single flipped bit in the associated data is rejected
        #[test]
        fn aead_aad_flip_rejected(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..128),
            aad in prop::collection::vec(any::<u8>(), 1..32),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            for (nonce_len, encrypt, decrypt) in flavours() {
                let nonce = &nonce[..nonce_len];
                let ct = encrypt(&plaintext, &aad, nonce, &key).unwrap();
                let mut tampered = aad.clone();
                let i = position.index(tampered.len());
                tampered[i] ^= 1 << bit;
                prop_assert!(decrypt(&ct, &tampered, nonce, &key).is_err());
            }
        }

        /// secretbox roundtrip, and a flipped bit anywhere is rejected
        #[test]
        fn secretbox_roundtrip_and_tamper(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..512),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut boxed = secretbox::secretbox(&plaintext, &nonce, &key).unwrap();
            prop_assert_eq!(secretbox::secretbox_open(&boxed, &nonce, &key).unwrap(), plaintext);

            let i = position.index(boxed.len());
            boxed[i] ^= 1 << bit;
            prop_assert!(secretbox::secretbox_open(&boxed, &nonce, &key).is_err());
        }

        /// Decryption with a different key fails
        #[test]
        fn wrong_key_decryption_fails(
            key1 in any::<[u8; 32]>(),
            key2 in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            plaintext in prop::collection::vec(any::<u8>(), 1..64),
        ) {
            prop_assume!(key1 != key2);
            let ct = aead::xchacha20poly1305_ietf_encrypt(&plaintext, b"", &nonce, &key1).unwrap();
            prop_assert!(aead::xchacha20poly1305_ietf_decrypt(&ct, b"", &nonce, &key2).is_err());
        }
    }
}

// ============================================================================
// Public-key Properties
// ============================================================================

mod public_key_properties {
    use super::*;
    use natrium_crypto::curve25519::scalarmult;
    use natrium_crypto::{box_, sign};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// X25519 agreement is symmetric
        #[test]
        fn dh_symmetry(seed_a in any::<[u8; 32]>(), seed_b in any::<[u8; 32]>()) {
            let a = box_::seed_keypair(&seed_a).unwrap();
            let b = box_::seed_keypair(&seed_b).unwrap();
            prop_assert_eq!(
                scalarmult(a.secret(), b.public()).unwrap(),
                scalarmult(b.secret(), a.public()).unwrap()
            );
        }

        /// box from A to B opens at B with A's public key
        #[test]
        fn box_roundtrip(
            seed_a in any::<[u8; 32]>(),
            seed_b in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            message in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let a = box_::seed_keypair(&seed_a).unwrap();
            let b = box_::seed_keypair(&seed_b).unwrap();
            let ct = box_::easy(&message, &nonce, b.public(), a.secret()).unwrap();
            prop_assert_eq!(box_::open_easy(&ct, &nonce, a.public(), b.secret()).unwrap(), message);
        }

        /// Sealed boxes open with the recipient keypair only
        #[test]
        fn seal_roundtrip(
            seed in any::<[u8; 32]>(),
            other in any::<[u8; 32]>(),
            message in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            prop_assume!(seed != other);
            let recipient = box_::seed_keypair(&seed).unwrap();
            let stranger = box_::seed_keypair(&other).unwrap();
            let sealed = box_::seal(&message, recipient.public()).unwrap();
            prop_assert_eq!(sealed.len(), message.len() + box_::SEAL_SIZE);
            prop_assert_eq!(box_::seal_open(&sealed, &recipient.to_bytes()[..]).unwrap(), message);
            prop_assert!(box_::seal_open(&sealed, &stranger.to_bytes()[..]).is_err());
        }

        /// Signatures verify under the signer's key and nothing else
        #[test]
        fn sign_verify(
            seed in any::<[u8; 32]>(),
            other in any::<[u8; 32]>(),
            message in prop::collection::vec(any::<u8>(), 0..256),
            position in any::<prop::sample::Index>(),
        ) {
            prop_assume!(seed != other);
            let pair = sign::SignKeyPair::from_seed(&seed);
            let stranger = sign::SignKeyPair::from_seed(&other);
            let sig = pair.sign(&message);

            prop_assert!(sign::verify_detached(&sig, &message, pair.public()).is_ok());
            prop_assert!(sign::verify_detached(&sig, &message, stranger.public()).is_err());

            if !message.is_empty() {
                let mut mutated = message.clone();
                let i = position.index(mutated.len());
                mutated[i] ^= 0x01;
                prop_assert!(sign::verify_detached(&sig, &mutated, pair.public()).is_err());
            }
        }

        /// Ed25519 → X25519 conversion agrees with scalarmult_base
        #[test]
        fn ed25519_to_curve25519_consistent(seed in any::<[u8; 32]>()) {
            let pair = sign::SignKeyPair::from_seed(&seed);
            let xsk = sign::sk_to_curve25519(pair.secret()).unwrap();
            let xpk = sign::pk_to_curve25519(pair.public()).unwrap();
            prop_assert_eq!(
                natrium_crypto::curve25519::scalarmult_base(&xsk[..]).unwrap(),
                xpk
            );
        }
    }
}

// ============================================================================
// Hash Properties
// ============================================================================

mod hash_properties {
    use super::*;
    use natrium_crypto::generichash::{GenericHashState, generichash};

    proptest! {
        /// Streaming in arbitrary chunks equals the one-shot digest
        #[test]
        fn generichash_chunking_invariant(
            message in prop::collection::vec(any::<u8>(), 0..600),
            key in prop::collection::vec(any::<u8>(), 0..=64),
            outlen in 1usize..=64,
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
        ) {
            let mut points: Vec<usize> = cuts.iter().map(|c| c.index(message.len() + 1)).collect();
            points.push(0);
            points.push(message.len());
            points.sort_unstable();

            let mut state = GenericHashState::new(&key, outlen).unwrap();
            for window in points.windows(2) {
                state.update(&message[window[0]..window[1]]);
            }
            prop_assert_eq!(state.finalize(), generichash(&message, &key, outlen).unwrap());
        }

        /// Serialising the context mid-stream does not change the digest
        #[test]
        fn generichash_context_resume(
            message in prop::collection::vec(any::<u8>(), 0..400),
            split in any::<prop::sample::Index>(),
        ) {
            let at = split.index(message.len() + 1);
            let mut state = GenericHashState::new(b"resume", 32).unwrap();
            state.update(&message[..at]);
            let mut resumed = GenericHashState::from_bytes(&state.to_bytes()[..]).unwrap();
            resumed.update(&message[at..]);
            prop_assert_eq!(resumed.finalize(), generichash(&message, b"resume", 32).unwrap());
        }
    }
}

// ============================================================================
// Constant-time Utility Properties
// ============================================================================

mod util_properties {
    use super::*;
    use natrium_crypto::codec;
    use natrium_crypto::constant_time::{add, compare, increment, memcmp};

    fn le_value(bytes: &[u8]) -> u128 {
        bytes.iter().rev().fold(0u128, |acc, &b| (acc << 8) | u128::from(b))
    }

    proptest! {
        /// memcmp agrees with ordinary equality
        #[test]
        fn memcmp_matches_eq(a in any::<[u8; 16]>(), b in any::<[u8; 16]>()) {
            prop_assert_eq!(memcmp(&a, &b).unwrap(), a == b);
            prop_assert!(memcmp(&a, &a).unwrap());
        }

        /// compare orders buffers as little-endian integers
        #[test]
        fn compare_little_endian(a in any::<[u8; 16]>(), b in any::<[u8; 16]>()) {
            let expected = match le_value(&a).cmp(&le_value(&b)) {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => 1,
            };
            prop_assert_eq!(compare(&a, &b).unwrap(), expected);
        }

        /// increment and add are arithmetic modulo 2^(8·len)
        #[test]
        fn increment_and_add(a in any::<[u8; 8]>(), b in any::<[u8; 8]>()) {
            let mut n = a;
            increment(&mut n);
            prop_assert_eq!(u64::from_le_bytes(n), u64::from_le_bytes(a).wrapping_add(1));

            let mut sum = a;
            add(&mut sum, &b).unwrap();
            prop_assert_eq!(
                u64::from_le_bytes(sum),
                u64::from_le_bytes(a).wrapping_add(u64::from_le_bytes(b))
            );
        }

        /// hex2bin inverts bin2hex and ignores configured separators
        #[test]
        fn hex_codec_inverse(bin in prop::collection::vec(any::<u8>(), 0..64)) {
            let hex = codec::bin2hex(&bin);
            prop_assert_eq!(codec::hex2bin(&hex, "").unwrap(), bin.clone());

            let spaced: Vec<String> = bin.iter().map(|b| format!("{b:02x}")).collect();
            prop_assert_eq!(codec::hex2bin(&spaced.join(":"), ":").unwrap(), bin);
        }
    }
}

// ============================================================================
// Password Hashing Properties
// ============================================================================

mod pwhash_properties {
    use super::*;
    use natrium_crypto::pwhash::{self, Algorithm};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(4))]

        /// pwhash_str verifies its own password, rejects others, and salts freshly
        #[test]
        fn pwhash_str_verify_roundtrip(
            password in prop::collection::vec(any::<u8>(), 0..32),
            other in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            prop_assume!(password != other);
            let ops = pwhash::OPSLIMIT_MIN;
            let mem = pwhash::MEMLIMIT_MIN;

            let first = pwhash::pwhash_str(&password, ops, mem).unwrap();
            let second = pwhash::pwhash_str(&password, ops, mem).unwrap();
            prop_assert_ne!(&first, &second);

            prop_assert!(pwhash::pwhash_str_verify(&password, &first).is_ok());
            prop_assert!(pwhash::pwhash_str_verify(&other, &first).is_err());
        }

        /// Raw derivation is deterministic for a fixed salt
        #[test]
        fn pwhash_deterministic(
            password in prop::collection::vec(any::<u8>(), 0..32),
            salt in any::<[u8; 16]>(),
        ) {
            let derive = || {
                pwhash::pwhash(
                    32,
                    &password,
                    &salt,
                    3,
                    pwhash::MEMLIMIT_MIN,
                    Algorithm::Argon2i13,
                )
                .unwrap()
            };
            prop_assert_eq!(derive(), derive());
        }
    }
}
