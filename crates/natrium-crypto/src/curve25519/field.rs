//! Arithmetic in GF(2^255 - 19).
//!
//! Elements are five unsigned 51-bit limbs. Every operation returns a
//! weakly reduced element (each limb below 2^52), so products of two
//! elements fit comfortably in `u128` accumulators. Only
//! [`FieldElement::to_bytes`] produces the canonical representative.

use core::ops::{Add, Mul, Neg, Sub};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::arith::load64_le;

const MASK51: u64 = (1 << 51) - 1;

/// An element of GF(2^255 - 19).
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(pub(crate) [u64; 5]);

impl FieldElement {
    /// Zero.
    pub const ZERO: Self = Self([0, 0, 0, 0, 0]);

    /// One.
    pub const ONE: Self = Self([1, 0, 0, 0, 0]);

    /// Edwards curve constant d = -121665/121666.
    pub const EDWARDS_D: Self = Self([
        929_955_233_495_203,
        466_365_720_129_213,
        1_662_059_464_998_953,
        2_033_849_074_728_123,
        1_442_794_654_840_575,
    ]);

    /// 2d.
    pub const EDWARDS_D2: Self = Self([
        1_859_910_466_990_425,
        932_731_440_258_426,
        1_072_319_116_312_658,
        1_815_898_335_770_999,
        633_789_495_995_903,
    ]);

    /// A square root of -1.
    pub const SQRT_M1: Self = Self([
        1_718_705_420_411_056,
        234_908_883_556_509,
        2_233_514_472_574_048,
        2_117_202_627_021_982,
        765_476_049_583_133,
    ]);

    /// (A - 2) / 4 for Curve25519's Montgomery form.
    pub const A24: Self = Self([121_665, 0, 0, 0, 0]);

    /// Carry each limb into the next, folding the top carry back times 19.
    #[inline]
    fn weak_reduce(mut limbs: [u64; 5]) -> Self {
        let c0 = limbs[0] >> 51;
        let c1 = limbs[1] >> 51;
        let c2 = limbs[2] >> 51;
        let c3 = limbs[3] >> 51;
        let c4 = limbs[4] >> 51;

        limbs[0] &= MASK51;
        limbs[1] &= MASK51;
        limbs[2] &= MASK51;
        limbs[3] &= MASK51;
        limbs[4] &= MASK51;

        limbs[0] += c4 * 19;
        limbs[1] += c0;
        limbs[2] += c1;
        limbs[3] += c2;
        limbs[4] += c3;

        Self(limbs)
    }

    /// Decode 32 little-endian bytes, ignoring the top bit.
    ///
    /// Values in `[p, 2^255)` are accepted and reduced implicitly.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self([
            load64_le(&bytes[0..]) & MASK51,
            (load64_le(&bytes[6..]) >> 3) & MASK51,
            (load64_le(&bytes[12..]) >> 6) & MASK51,
            (load64_le(&bytes[19..]) >> 1) & MASK51,
            (load64_le(&bytes[24..]) >> 12) & MASK51,
        ])
    }

    /// Canonical little-endian encoding.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut limbs = Self::weak_reduce(self.0).0;

        // q = 1 iff the value is at least p
        let mut q = (limbs[0] + 19) >> 51;
        q = (limbs[1] + q) >> 51;
        q = (limbs[2] + q) >> 51;
        q = (limbs[3] + q) >> 51;
        q = (limbs[4] + q) >> 51;

        limbs[0] += 19 * q;
        limbs[1] += limbs[0] >> 51;
        limbs[0] &= MASK51;
        limbs[2] += limbs[1] >> 51;
        limbs[1] &= MASK51;
        limbs[3] += limbs[2] >> 51;
        limbs[2] &= MASK51;
        limbs[4] += limbs[3] >> 51;
        limbs[3] &= MASK51;
        limbs[4] &= MASK51;

        let mut out = [0u8; 32];
        let mut acc: u128 = 0;
        let mut bits = 0u32;
        let mut pos = 0usize;
        for limb in limbs {
            acc |= u128::from(limb) << bits;
            bits += 51;
            while bits >= 8 {
                out[pos] = acc as u8;
                acc >>= 8;
                bits -= 8;
                pos += 1;
            }
        }
        out[pos] = acc as u8;
        out
    }

    /// Square.
    #[must_use]
    pub fn square(&self) -> Self {
        self * self
    }

    /// Square `k` times.
    #[must_use]
    pub fn pow2k(&self, k: u32) -> Self {
        debug_assert!(k > 0);
        let mut out = self.square();
        for _ in 1..k {
            out = out.square();
        }
        out
    }

    /// Returns `(self^(2^250 - 1), self^11)`.
    fn pow22501(&self) -> (Self, Self) {
        let t0 = self.square(); // 2
        let t1 = t0.pow2k(2); // 8
        let t2 = self * &t1; // 9
        let t3 = &t0 * &t2; // 11
        let t4 = t3.square(); // 22
        let t5 = &t2 * &t4; // 2^5 - 1
        let t7 = &t5.pow2k(5) * &t5; // 2^10 - 1
        let t9 = &t7.pow2k(10) * &t7; // 2^20 - 1
        let t11 = &t9.pow2k(20) * &t9; // 2^40 - 1
        let t13 = &t11.pow2k(10) * &t7; // 2^50 - 1
        let t15 = &t13.pow2k(50) * &t13; // 2^100 - 1
        let t17 = &t15.pow2k(100) * &t15; // 2^200 - 1
        let t19 = &t17.pow2k(50) * &t13; // 2^250 - 1
        (t19, t3)
    }

    /// Multiplicative inverse, `self^(p - 2)`. Zero maps to zero.
    #[must_use]
    pub fn invert(&self) -> Self {
        let (t19, t3) = self.pow22501();
        &t19.pow2k(5) * &t3
    }

    /// `self^((p - 5) / 8)`.
    #[must_use]
    pub fn pow_p58(&self) -> Self {
        let (t19, _) = self.pow22501();
        &t19.pow2k(2) * self
    }

    /// Whether the canonical encoding is odd.
    #[must_use]
    pub fn is_negative(&self) -> Choice {
        Choice::from(self.to_bytes()[0] & 1)
    }

    /// Whether the element is zero.
    #[must_use]
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Self::ZERO)
    }

    /// Negate if `choice` is set.
    pub fn conditional_negate(&mut self, choice: Choice) {
        let negated = -&*self;
        self.conditional_assign(&negated, choice);
    }

    /// Absolute value: the non-negative one of `self` and `-self`.
    #[must_use]
    pub fn abs(&self) -> Self {
        let mut out = *self;
        out.conditional_negate(self.is_negative());
        out
    }

    /// Compute `sqrt(u / v)` when it exists.
    ///
    /// Returns `(was_square, r)`. When `u / v` is not a square, `r` is
    /// `sqrt(i * u / v)` instead. `r` is always non-negative.
    #[must_use]
    pub fn sqrt_ratio_i(u: &Self, v: &Self) -> (Choice, Self) {
        let v3 = &v.square() * v;
        let v7 = &v3.square() * v;
        let mut r = &(u * &v3) * &(u * &v7).pow_p58();
        let check = v * &r.square();

        let neg_u = -u;
        let correct_sign = check.ct_eq(u);
        let flipped_sign = check.ct_eq(&neg_u);
        let flipped_sign_i = check.ct_eq(&(&neg_u * &Self::SQRT_M1));

        let r_prime = &Self::SQRT_M1 * &r;
        r.conditional_assign(&r_prime, flipped_sign | flipped_sign_i);
        let r = r.abs();

        (correct_sign | flipped_sign, r)
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.to_bytes().ct_eq(&other.to_bytes())
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
            u64::conditional_select(&a.0[4], &b.0[4], choice),
        ])
    }

    fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice) {
        for i in 0..5 {
            u64::conditional_swap(&mut a.0[i], &mut b.0[i], choice);
        }
    }
}

impl zeroize::Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Add for &FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &FieldElement) -> FieldElement {
        let a = &self.0;
        let b = &rhs.0;
        FieldElement::weak_reduce([
            a[0] + b[0],
            a[1] + b[1],
            a[2] + b[2],
            a[3] + b[3],
            a[4] + b[4],
        ])
    }
}

impl Sub for &FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &FieldElement) -> FieldElement {
        // add 16p so no limb underflows
        let a = &self.0;
        let b = &rhs.0;
        FieldElement::weak_reduce([
            (a[0] + 36_028_797_018_963_664) - b[0],
            (a[1] + 36_028_797_018_963_952) - b[1],
            (a[2] + 36_028_797_018_963_952) - b[2],
            (a[3] + 36_028_797_018_963_952) - b[3],
            (a[4] + 36_028_797_018_963_952) - b[4],
        ])
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        &FieldElement::ZERO - self
    }
}

impl Mul for &FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &FieldElement) -> FieldElement {
        #[inline(always)]
        fn m(x: u64, y: u64) -> u128 {
            u128::from(x) * u128::from(y)
        }

        let a = &self.0;
        let b = &rhs.0;

        let b1_19 = b[1] * 19;
        let b2_19 = b[2] * 19;
        let b3_19 = b[3] * 19;
        let b4_19 = b[4] * 19;

        let c0 = m(a[0], b[0]) + m(a[4], b1_19) + m(a[3], b2_19) + m(a[2], b3_19) + m(a[1], b4_19);
        let mut c1 =
            m(a[1], b[0]) + m(a[0], b[1]) + m(a[4], b2_19) + m(a[3], b3_19) + m(a[2], b4_19);
        let mut c2 =
            m(a[2], b[0]) + m(a[1], b[1]) + m(a[0], b[2]) + m(a[4], b3_19) + m(a[3], b4_19);
        let mut c3 =
            m(a[3], b[0]) + m(a[2], b[1]) + m(a[1], b[2]) + m(a[0], b[3]) + m(a[4], b4_19);
        let mut c4 = m(a[4], b[0]) + m(a[3], b[1]) + m(a[2], b[2]) + m(a[1], b[3]) + m(a[0], b[4]);

        let mut out = [0u64; 5];
        c1 += c0 >> 51;
        out[0] = (c0 as u64) & MASK51;
        c2 += c1 >> 51;
        out[1] = (c1 as u64) & MASK51;
        c3 += c2 >> 51;
        out[2] = (c2 as u64) & MASK51;
        c4 += c3 >> 51;
        out[3] = (c3 as u64) & MASK51;
        let carry = (c4 >> 51) as u64;
        out[4] = (c4 as u64) & MASK51;

        out[0] += carry * 19;
        out[1] += out[0] >> 51;
        out[0] &= MASK51;

        FieldElement(out)
    }
}

impl Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
