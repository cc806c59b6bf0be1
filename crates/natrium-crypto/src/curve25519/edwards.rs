//! Points on the twisted Edwards curve -x^2 + y^2 = 1 + d x^2 y^2.
//!
//! Points use extended coordinates (X : Y : Z : T) with x = X/Z, y = Y/Z and
//! T = XY/Z. The unified addition law is complete on this curve, so doubling
//! reuses it and no input needs special-casing.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::field::FieldElement;
use super::scalar::Scalar;

/// A point in extended twisted Edwards coordinates.
#[derive(Clone, Copy, Debug)]
pub struct EdwardsPoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
    pub(crate) t: FieldElement,
}

/// Compressed encoding of the base point: y = 4/5, x even.
pub const BASEPOINT_COMPRESSED: [u8; 32] = [
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
];

impl EdwardsPoint {
    /// The neutral element (0, 1).
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
        t: FieldElement::ZERO,
    };

    /// The Ed25519 base point B.
    pub const BASEPOINT: Self = Self {
        x: FieldElement([
            1_738_742_601_995_546,
            1_146_398_526_822_698,
            2_070_867_633_025_821,
            562_264_141_797_630,
            587_772_402_128_613,
        ]),
        y: FieldElement([
            1_801_439_850_948_184,
            1_351_079_888_211_148,
            450_359_962_737_049,
            900_719_925_474_099,
            1_801_439_850_948_198,
        ]),
        z: FieldElement::ONE,
        t: FieldElement([
            1_841_354_044_333_475,
            16_398_895_984_059,
            755_974_180_946_558,
            900_171_276_175_154,
            1_821_297_809_914_039,
        ]),
    };

    /// Unified addition (add-2008-hwcd-3).
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let a = &(&self.y - &self.x) * &(&other.y - &other.x);
        let b = &(&self.y + &self.x) * &(&other.y + &other.x);
        let c = &(&self.t * &FieldElement::EDWARDS_D2) * &other.t;
        let zz = &self.z * &other.z;
        let d = &zz + &zz;

        let e = &b - &a;
        let f = &d - &c;
        let g = &d + &c;
        let h = &b + &a;

        Self {
            x: &e * &f,
            y: &g * &h,
            z: &f * &g,
            t: &e * &h,
        }
    }

    /// `2 * self`.
    #[must_use]
    pub fn double(&self) -> Self {
        self.add(self)
    }

    /// `-self`.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            x: -&self.x,
            y: self.y,
            z: self.z,
            t: -&self.t,
        }
    }

    /// `self - other`.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    /// Multiply by a 256-bit little-endian scalar.
    ///
    /// Runs a fixed double-and-add-always sequence over all 256 bits with
    /// constant-time selection, so it is safe for secret scalars.
    #[must_use]
    pub fn mul(&self, scalar: &[u8; 32]) -> Self {
        let mut acc = Self::IDENTITY;
        for i in (0..256).rev() {
            acc = acc.double();
            let sum = acc.add(self);
            acc = Self::conditional_select(&acc, &sum, Choice::from(Scalar::bit(scalar, i)));
        }
        acc
    }

    /// `scalar * B`.
    #[must_use]
    pub fn mul_base(scalar: &[u8; 32]) -> Self {
        Self::BASEPOINT.mul(scalar)
    }

    /// `8 * self`.
    #[must_use]
    pub fn mul_by_cofactor(&self) -> Self {
        self.double().double().double()
    }

    /// Whether this is the neutral element.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.ct_eq(&Self::IDENTITY).into()
    }

    /// Whether the point lies in the 8-torsion subgroup.
    #[must_use]
    pub fn is_small_order(&self) -> bool {
        self.mul_by_cofactor().is_identity()
    }

    /// Whether the point lies in the prime-order subgroup generated by B.
    #[must_use]
    pub fn is_torsion_free(&self) -> bool {
        self.mul(&Scalar::ORDER_BYTES).is_identity()
    }

    /// 32-byte encoding: y with the sign of x in the top bit.
    #[must_use]
    pub fn compress(&self) -> [u8; 32] {
        let zinv = self.z.invert();
        let x = &self.x * &zinv;
        let y = &self.y * &zinv;
        let mut s = y.to_bytes();
        s[31] ^= x.is_negative().unwrap_u8() << 7;
        s
    }

    /// Decode a point. Returns `None` when y does not correspond to a
    /// curve point.
    ///
    /// A y coordinate in `[p, 2^255)` is reduced rather than rejected; use
    /// [`is_canonical_encoding`] where that matters.
    #[must_use]
    pub fn decompress(bytes: &[u8; 32]) -> Option<Self> {
        let y = FieldElement::from_bytes(bytes);
        let yy = y.square();
        let u = &yy - &FieldElement::ONE;
        let v = &(&yy * &FieldElement::EDWARDS_D) + &FieldElement::ONE;

        let (is_square, mut x) = FieldElement::sqrt_ratio_i(&u, &v);
        if !bool::from(is_square) {
            return None;
        }

        let sign = Choice::from(bytes[31] >> 7);
        x.conditional_negate(sign);

        Some(Self {
            x,
            y,
            z: FieldElement::ONE,
            t: &x * &y,
        })
    }

    /// The Montgomery u-coordinate `(1 + y) / (1 - y)`.
    #[must_use]
    pub fn to_montgomery(&self) -> [u8; 32] {
        // with y = Y/Z this is (Z + Y) / (Z - Y)
        let num = &self.z + &self.y;
        let den = &self.z - &self.y;
        (&num * &den.invert()).to_bytes()
    }
}

/// Whether the y coordinate of an encoded point is below p.
#[must_use]
pub fn is_canonical_encoding(bytes: &[u8; 32]) -> bool {
    // y >= p only when bytes 1..=30 are 0xff, byte 31 is 0x7f (sign ignored)
    // and byte 0 is at least 0xed
    let mut c = u32::from((bytes[31] & 0x7f) ^ 0x7f);
    for &b in &bytes[1..31] {
        c |= u32::from(b ^ 0xff);
    }
    let high_all_ones = c.wrapping_sub(1) >> 8;
    let low_at_least_ed = 0xed_u32.wrapping_sub(1).wrapping_sub(u32::from(bytes[0])) >> 8;
    (high_all_ones & low_at_least_ed & 1) == 0
}

impl ConstantTimeEq for EdwardsPoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        (&self.x * &other.z).ct_eq(&(&other.x * &self.z))
            & (&self.y * &other.z).ct_eq(&(&other.y * &self.z))
    }
}

impl PartialEq for EdwardsPoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for EdwardsPoint {}

impl ConditionallySelectable for EdwardsPoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
            t: FieldElement::conditional_select(&a.t, &b.t, choice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(n: u64) -> [u8; 32] {
        let mut s = [0u8; 32];
        s[..8].copy_from_slice(&n.to_le_bytes());
        s
    }

    #[test]
    fn test_basepoint_round_trips() {
        assert_eq!(EdwardsPoint::BASEPOINT.compress(), BASEPOINT_COMPRESSED);
        let b = EdwardsPoint::decompress(&BASEPOINT_COMPRESSED).unwrap();
        assert_eq!(b, EdwardsPoint::BASEPOINT);
        assert_eq!(b.t, &b.x * &b.y);
    }

    #[test]
    fn test_identity_laws() {
        let b = EdwardsPoint::BASEPOINT;
        assert_eq!(b.add(&EdwardsPoint::IDENTITY), b);
        assert!(b.sub(&b).is_identity());
        assert_eq!(EdwardsPoint::IDENTITY.compress()[0], 1);
    }

    #[test]
    fn test_scalar_mul_matches_repeated_addition() {
        let b = EdwardsPoint::BASEPOINT;
        let mut acc = EdwardsPoint::IDENTITY;
        for n in 0..10u64 {
            assert_eq!(EdwardsPoint::mul_base(&scalar(n)), acc, "n = {n}");
            acc = acc.add(&b);
        }
    }

    #[test]
    fn test_basepoint_has_order_l() {
        assert!(EdwardsPoint::BASEPOINT.is_torsion_free());
        assert!(!EdwardsPoint::BASEPOINT.is_small_order());
        assert!(!EdwardsPoint::BASEPOINT.is_identity());
    }

    #[test]
    fn test_small_order_points() {
        // y = 0 is order 4, y = -1 is order 2
        let zero = [0u8; 32];
        let p4 = EdwardsPoint::decompress(&zero).unwrap();
        assert!(p4.is_small_order());
        assert!(!p4.is_identity());

        let mut minus_one = [0xffu8; 32];
        minus_one[0] = 0xec;
        minus_one[31] = 0x7f;
        let p2 = EdwardsPoint::decompress(&minus_one).unwrap();
        assert!(p2.double().is_identity());

        let mixed = EdwardsPoint::BASEPOINT.add(&p4);
        assert!(!mixed.is_small_order());
        assert!(!mixed.is_torsion_free());
    }

    #[test]
    fn test_decompress_rejects_non_points() {
        // y = 2 gives x^2 = 3 / (4d + 1), which is not a square
        let mut y2 = [0u8; 32];
        y2[0] = 2;
        assert!(EdwardsPoint::decompress(&y2).is_none());
    }

    #[test]
    fn test_sign_bit_negates_x() {
        let mut enc = BASEPOINT_COMPRESSED;
        enc[31] |= 0x80;
        let neg = EdwardsPoint::decompress(&enc).unwrap();
        assert_eq!(neg, EdwardsPoint::BASEPOINT.negate());
        assert!(neg.add(&EdwardsPoint::BASEPOINT).is_identity());
    }

    #[test]
    fn test_canonical_encoding() {
        assert!(is_canonical_encoding(&BASEPOINT_COMPRESSED));
        let mut p = [0xffu8; 32];
        p[0] = 0xed;
        p[31] = 0x7f;
        assert!(!is_canonical_encoding(&p));
        p[31] = 0xff;
        assert!(!is_canonical_encoding(&p));
        p[0] = 0xec;
        assert!(is_canonical_encoding(&p));
    }

    #[test]
    fn test_basepoint_to_montgomery_is_nine() {
        let mut nine = [0u8; 32];
        nine[0] = 9;
        assert_eq!(EdwardsPoint::BASEPOINT.to_montgomery(), nine);
    }
}
