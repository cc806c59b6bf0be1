//! BLAKE2b generic hashing (`crypto_generichash`).
//!
//! Output is 1 to 64 bytes (default 32) and the optional key up to 64
//! bytes. [`GenericHashState`] is the streaming form; chunk boundaries
//! passed to [`update`](GenericHashState::update) never affect the digest.
//! A state can be frozen into a fixed 384-byte context with
//! [`GenericHashState::to_bytes`] and resumed later.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::CryptoError;
use crate::arith::{add64, load64_le, rotr64, store64_le};
use crate::error::fixed_array;
use crate::random::random_32;

/// Default digest size.
pub const BYTES: usize = 32;

/// Smallest digest size.
pub const BYTES_MIN: usize = 1;

/// Largest digest size.
pub const BYTES_MAX: usize = 64;

/// Default key size.
pub const KEY_BYTES: usize = 32;

/// Largest key size.
pub const KEY_BYTES_MAX: usize = 64;

/// Salt size.
pub const SALT_BYTES: usize = 16;

/// Personalisation size.
pub const PERSONAL_BYTES: usize = 16;

/// Size of a serialised streaming context.
pub const STATE_BYTES: usize = 384;

const BLOCK_BYTES: usize = 128;

const IV: [u64; 8] = [
    0x6a09_e667_f3bc_c908,
    0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b,
    0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1,
    0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b,
    0x5be0_cd19_137e_2179,
];

const SIGMA: [[usize; 16]; 12] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

// serialised layout
const OFF_H: usize = 0;
const OFF_T: usize = 64;
const OFF_F: usize = 80;
const OFF_BUF: usize = 96;
const OFF_BUFLEN: usize = 352;
const OFF_OUTLEN: usize = 360;

#[inline(always)]
#[allow(clippy::many_single_char_names)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = add64(add64(v[a], v[b]), x);
    v[d] = rotr64(v[d] ^ v[a], 32);
    v[c] = add64(v[c], v[d]);
    v[b] = rotr64(v[b] ^ v[c], 24);
    v[a] = add64(add64(v[a], v[b]), y);
    v[d] = rotr64(v[d] ^ v[a], 16);
    v[c] = add64(v[c], v[d]);
    v[b] = rotr64(v[b] ^ v[c], 63);
}

/// Streaming BLAKE2b state.
///
/// Created by [`new`](Self::new), fed with [`update`](Self::update) and
/// consumed by [`finalize`](Self::finalize), so a finished state cannot be
/// reused.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct GenericHashState {
    h: [u64; 8],
    t: [u64; 2],
    buf: [u8; BLOCK_BYTES],
    buflen: usize,
    outlen: usize,
}

impl GenericHashState {
    /// Start an unsalted hash with an optional key.
    ///
    /// # Errors
    ///
    /// Returns an error if `outlen` is outside 1..=64 or `key` exceeds 64
    /// bytes.
    pub fn new(key: &[u8], outlen: usize) -> Result<Self, CryptoError> {
        Self::with_params(key, outlen, &[0u8; SALT_BYTES], &[0u8; PERSONAL_BYTES])
    }

    /// Start a hash with salt and personalisation
    /// (`crypto_generichash_blake2b_init_salt_personal`).
    ///
    /// # Errors
    ///
    /// Returns an error if `outlen` is outside 1..=64 or `key` exceeds 64
    /// bytes.
    pub fn with_params(
        key: &[u8],
        outlen: usize,
        salt: &[u8; SALT_BYTES],
        personal: &[u8; PERSONAL_BYTES],
    ) -> Result<Self, CryptoError> {
        if !(BYTES_MIN..=BYTES_MAX).contains(&outlen) {
            return Err(CryptoError::InvalidParameter(format!(
                "digest length must be {BYTES_MIN}..={BYTES_MAX}, got {outlen}"
            )));
        }
        if key.len() > KEY_BYTES_MAX {
            return Err(CryptoError::InvalidParameter(format!(
                "hash key length must be at most {KEY_BYTES_MAX}, got {}",
                key.len()
            )));
        }

        let mut param = [0u8; 64];
        param[0] = outlen as u8;
        param[1] = key.len() as u8;
        param[2] = 1; // fanout
        param[3] = 1; // depth
        param[32..48].copy_from_slice(salt);
        param[48..64].copy_from_slice(personal);

        let mut h = IV;
        for (i, word) in h.iter_mut().enumerate() {
            *word ^= load64_le(&param[i * 8..]);
        }

        let mut state = Self {
            h,
            t: [0; 2],
            buf: [0; BLOCK_BYTES],
            buflen: 0,
            outlen,
        };

        if !key.is_empty() {
            let mut block = Zeroizing::new([0u8; BLOCK_BYTES]);
            block[..key.len()].copy_from_slice(key);
            state.update(&block[..]);
        }
        Ok(state)
    }

    fn increment_counter(&mut self, inc: u64) {
        self.t[0] = self.t[0].wrapping_add(inc);
        if self.t[0] < inc {
            self.t[1] = self.t[1].wrapping_add(1);
        }
    }

    fn compress(&mut self, block: &[u8; BLOCK_BYTES], last: bool) {
        let mut m = [0u64; 16];
        for (i, word) in m.iter_mut().enumerate() {
            *word = load64_le(&block[i * 8..]);
        }

        let mut v = [0u64; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..].copy_from_slice(&IV);
        v[12] ^= self.t[0];
        v[13] ^= self.t[1];
        if last {
            v[14] = !v[14];
        }

        for s in &SIGMA {
            g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
            g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
            g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
            g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
            g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
            g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
            g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
            g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
        }

        for i in 0..8 {
            self.h[i] ^= v[i] ^ v[i + 8];
        }
        m.zeroize();
        v.zeroize();
    }

    /// Absorb more input.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            // the last block is held back until finalize so it can be flagged
            if self.buflen == BLOCK_BYTES {
                self.increment_counter(BLOCK_BYTES as u64);
                let block = self.buf;
                self.compress(&block, false);
                self.buflen = 0;
            }
            let take = (BLOCK_BYTES - self.buflen).min(data.len());
            self.buf[self.buflen..self.buflen + take].copy_from_slice(&data[..take]);
            self.buflen += take;
            data = &data[take..];
        }
    }

    /// Finish and return the digest.
    #[must_use]
    pub fn finalize(mut self) -> Vec<u8> {
        self.increment_counter(self.buflen as u64);
        let mut block = [0u8; BLOCK_BYTES];
        block[..self.buflen].copy_from_slice(&self.buf[..self.buflen]);
        self.compress(&block, true);
        block.zeroize();

        let mut full = Zeroizing::new([0u8; 64]);
        for (i, word) in self.h.iter().enumerate() {
            store64_le(&mut full[i * 8..], *word);
        }
        full[..self.outlen].to_vec()
    }

    /// Digest length this state was created for.
    #[must_use]
    pub fn output_len(&self) -> usize {
        self.outlen
    }

    /// Serialise into a 384-byte context: chaining value, counter, final
    /// flags, block buffer, buffered length and digest length, all
    /// little-endian.
    #[must_use]
    pub fn to_bytes(&self) -> Zeroizing<[u8; STATE_BYTES]> {
        let mut out = Zeroizing::new([0u8; STATE_BYTES]);
        for (i, word) in self.h.iter().enumerate() {
            store64_le(&mut out[OFF_H + i * 8..], *word);
        }
        store64_le(&mut out[OFF_T..], self.t[0]);
        store64_le(&mut out[OFF_T + 8..], self.t[1]);
        // OFF_F stays zero: a serialised state is never finalised
        out[OFF_BUF..OFF_BUF + BLOCK_BYTES].copy_from_slice(&self.buf);
        store64_le(&mut out[OFF_BUFLEN..], self.buflen as u64);
        store64_le(&mut out[OFF_OUTLEN..], self.outlen as u64);
        out
    }

    /// Restore a state produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] if the context has the wrong
    /// size or carries out-of-range fields.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: &[u8; STATE_BYTES] = fixed_array("hash state", bytes)
            .map_err(|_| CryptoError::InvalidEncoding("hash state size".to_string()))?;

        let buflen = usize::try_from(load64_le(&bytes[OFF_BUFLEN..])).unwrap_or(usize::MAX);
        let outlen = usize::try_from(load64_le(&bytes[OFF_OUTLEN..])).unwrap_or(usize::MAX);
        let finalised = bytes[OFF_F..OFF_BUF].iter().any(|&b| b != 0);
        if buflen > BLOCK_BYTES || !(BYTES_MIN..=BYTES_MAX).contains(&outlen) || finalised {
            return Err(CryptoError::InvalidEncoding("hash state fields".to_string()));
        }

        let mut h = [0u64; 8];
        for (i, word) in h.iter_mut().enumerate() {
            *word = load64_le(&bytes[OFF_H + i * 8..]);
        }
        let mut buf = [0u8; BLOCK_BYTES];
        buf.copy_from_slice(&bytes[OFF_BUF..OFF_BUF + BLOCK_BYTES]);

        Ok(Self {
            h,
            t: [load64_le(&bytes[OFF_T..]), load64_le(&bytes[OFF_T + 8..])],
            buf,
            buflen,
            outlen,
        })
    }
}

/// One-shot BLAKE2b of `message` with an optional key.
///
/// # Errors
///
/// Returns an error if `outlen` is outside 1..=64 or `key` exceeds 64
/// bytes.
pub fn generichash(message: &[u8], key: &[u8], outlen: usize) -> Result<Vec<u8>, CryptoError> {
    let mut state = GenericHashState::new(key, outlen)?;
    state.update(message);
    Ok(state.finalize())
}

/// One-shot BLAKE2b with salt and personalisation.
///
/// # Errors
///
/// Returns an error on out-of-range output or key sizes, or if `salt` or
/// `personal` is not 16 bytes.
pub fn generichash_salt_personal(
    message: &[u8],
    key: &[u8],
    outlen: usize,
    salt: &[u8],
    personal: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let salt = fixed_array::<SALT_BYTES>("salt", salt)?;
    let personal = fixed_array::<PERSONAL_BYTES>("personal", personal)?;
    let mut state = GenericHashState::with_params(key, outlen, salt, personal)?;
    state.update(message);
    Ok(state.finalize())
}

/// Generate a random hash key of the default size.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] if the OS CSPRNG fails.
pub fn keygen() -> Result<[u8; KEY_BYTES], CryptoError> {
    random_32()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_hex(message: &[u8], key: &[u8], outlen: usize) -> String {
        hex::encode(generichash(message, key, outlen).unwrap())
    }

    #[test]
    fn test_rfc7693_abc() {
        assert_eq!(
            hash_hex(b"abc", &[], 64),
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
             7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
        );
    }

    #[test]
    fn test_keyed_vectors() {
        let key: Vec<u8> = (0u8..64).collect();
        assert_eq!(
            hash_hex(&[], &key, 64),
            "10ebb67700b1868efb4417987acf4690ae9d972fb7a590c2f02871799aaa4786\
             b5e996e8f0f4eb981fc214b005f42d2ff4233499391653df7aefcbc13fc51568"
        );
        let msg: Vec<u8> = (0u8..255).collect();
        assert_eq!(
            hash_hex(&msg, &key, 64),
            "142709d62e28fcccd0af97fad0f8465b971e82201dc51070faa0372aa43e9248\
             4be1c1e73ba10906d5d1853db6a4106e0a7bf9800d373d6dee2d46d62ef2a461"
        );
    }

    #[test]
    fn test_default_and_short_outputs() {
        assert_eq!(
            hash_hex(&[], &[], BYTES),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
        let msg: Vec<u8> = (0..1000usize).map(|i| i as u8).collect();
        assert_eq!(hash_hex(&msg, &[b'k'; 32], 16), "c20efe61f573037089ac5a0cd3914b1e");
    }

    #[test]
    fn test_exact_block_is_not_compressed_early() {
        assert_eq!(
            hash_hex(&[0u8; 128], &[], 64),
            "865939e120e6805438478841afb739ae4250cf372653078a065cdcfffca4caf7\
             98e6d462b65d658fc165782640eded70963449ae1500fb0f24981d7727e22c41"
        );
    }

    #[test]
    fn test_salt_personal() {
        let out = generichash_salt_personal(
            b"natrium",
            &[],
            32,
            b"0123456789abcdef",
            b"natrium-personal",
        )
        .unwrap();
        assert_eq!(
            hex::encode(out),
            "fac11976f9702b15d808e53e35c8747fadcd3f1221f461391f1a870eac022eb5"
        );
        assert!(generichash_salt_personal(b"", &[], 32, &[0u8; 8], &[0u8; 16]).is_err());
    }

    #[test]
    fn test_streaming_matches_oneshot() {
        let key = [0x42u8; 40];
        let msg: Vec<u8> = (0..777usize).map(|i| (i * 31) as u8).collect();
        let expected = generichash(&msg, &key, 48).unwrap();

        for chunk in [1usize, 3, 64, 127, 128, 129, 500] {
            let mut state = GenericHashState::new(&key, 48).unwrap();
            for piece in msg.chunks(chunk) {
                state.update(piece);
            }
            state.update(&[]);
            assert_eq!(state.finalize(), expected, "chunk size {chunk}");
        }
    }

    #[test]
    fn test_serialised_state_resumes() {
        let msg = b"the quick brown fox jumps over the lazy dog, repeatedly and at length";
        let expected = generichash(msg, b"0123456789abcdef", 32).unwrap();

        for split in [0usize, 5, msg.len()] {
            let mut state = GenericHashState::new(b"0123456789abcdef", 32).unwrap();
            state.update(&msg[..split]);
            let ctx = state.to_bytes();
            assert_eq!(ctx.len(), STATE_BYTES);

            let mut resumed = GenericHashState::from_bytes(&ctx[..]).unwrap();
            resumed.update(&msg[split..]);
            assert_eq!(resumed.finalize(), expected);
        }
    }

    #[test]
    fn test_state_rejects_bad_context() {
        assert!(GenericHashState::from_bytes(&[0u8; 100]).is_err());
        // outlen 0
        assert!(GenericHashState::from_bytes(&[0u8; STATE_BYTES]).is_err());

        let state = GenericHashState::new(&[], 32).unwrap();
        let mut ctx = state.to_bytes();
        ctx[OFF_BUFLEN] = 200;
        assert!(GenericHashState::from_bytes(&ctx[..]).is_err());
    }

    #[test]
    fn test_parameter_bounds() {
        assert!(generichash(b"", &[], 0).is_err());
        assert!(generichash(b"", &[], 65).is_err());
        assert!(generichash(b"", &[0u8; 65], 32).is_err());
        assert_eq!(generichash(b"", &[], 1).unwrap().len(), 1);
        assert_eq!(generichash(b"", &[0u8; 64], 64).unwrap().len(), 64);
    }

    #[test]
    fn test_bound_errors_name_the_range() {
        for outlen in [0, 65] {
            let msg = generichash(b"", &[], outlen).unwrap_err().to_string();
            assert!(msg.contains("1..=64"), "{msg}");
            assert!(msg.contains(&format!("got {outlen}")), "{msg}");
        }
        let msg = generichash(b"", &[0u8; 65], 32).unwrap_err().to_string();
        assert!(msg.contains("at most 64"), "{msg}");
    }
}
