//! X25519 (RFC 7748) over the Montgomery form of Curve25519.

use subtle::{Choice, ConditionallySelectable};
use zeroize::{Zeroize, Zeroizing};

use super::field::FieldElement;
use super::scalar::clamp;
use crate::CryptoError;
use crate::constant_time::is_zero;
use crate::error::{fixed_array, key_array};

/// X25519 scalar size.
pub const SCALAR_SIZE: usize = 32;

/// X25519 point (u-coordinate) size.
pub const POINT_SIZE: usize = 32;

/// The base point u = 9.
pub const BASEPOINT: [u8; 32] = {
    let mut b = [0u8; 32];
    b[0] = 9;
    b
};

/// Montgomery ladder: `clamp(scalar) * u`.
///
/// The top bit of `u` is ignored and non-canonical values are reduced.
#[must_use]
pub fn x25519(scalar: &[u8; 32], u: &[u8; 32]) -> [u8; 32] {
    let mut k = Zeroizing::new(*scalar);
    clamp(&mut k);

    let x1 = FieldElement::from_bytes(u);
    let mut x2 = FieldElement::ONE;
    let mut z2 = FieldElement::ZERO;
    let mut x3 = x1;
    let mut z3 = FieldElement::ONE;
    let mut swap = Choice::from(0);

    for t in (0..255).rev() {
        let bit = Choice::from((k[t >> 3] >> (t & 7)) & 1);
        swap ^= bit;
        FieldElement::conditional_swap(&mut x2, &mut x3, swap);
        FieldElement::conditional_swap(&mut z2, &mut z3, swap);
        swap = bit;

        let a = &x2 + &z2;
        let aa = a.square();
        let b = &x2 - &z2;
        let bb = b.square();
        let e = &aa - &bb;
        let c = &x3 + &z3;
        let d = &x3 - &z3;
        let da = &d * &a;
        let cb = &c * &b;

        x3 = (&da + &cb).square();
        z3 = &x1 * &(&da - &cb).square();
        x2 = &aa * &bb;
        z2 = &e * &(&aa + &(&FieldElement::A24 * &e));
    }

    FieldElement::conditional_swap(&mut x2, &mut x3, swap);
    FieldElement::conditional_swap(&mut z2, &mut z3, swap);

    let out = (&x2 * &z2.invert()).to_bytes();
    x2.zeroize();
    z2.zeroize();
    x3.zeroize();
    z3.zeroize();
    out
}

/// `crypto_scalarmult`: shared point `n * p`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] when the result is all zeros,
/// which happens exactly for low-order inputs.
pub fn scalarmult(n: &[u8], p: &[u8]) -> Result<[u8; 32], CryptoError> {
    let n = key_array::<SCALAR_SIZE>(n)?;
    let p = fixed_array::<POINT_SIZE>("public key", p)?;
    let q = x25519(n, p);
    if is_zero(&q) {
        tracing::debug!("scalarmult produced the all-zero point");
        return Err(CryptoError::InvalidPublicKey);
    }
    Ok(q)
}

/// `crypto_scalarmult_base`: public key for secret scalar `n`.
///
/// # Errors
///
/// Returns an error if `n` is not 32 bytes.
pub fn scalarmult_base(n: &[u8]) -> Result<[u8; 32], CryptoError> {
    let n = key_array::<SCALAR_SIZE>(n)?;
    Ok(x25519(n, &BASEPOINT))
}
