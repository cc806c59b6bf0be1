//! Curve25519 arithmetic shared by X25519, Ed25519 and the box constructions.
//!
//! - [`field`]: GF(2^255 - 19) in radix 2^51
//! - [`scalar`]: integers modulo the group order ℓ
//! - [`edwards`]: the twisted Edwards form used by Ed25519
//! - [`montgomery`]: the X25519 ladder

pub mod edwards;
pub mod field;
pub mod montgomery;
pub mod scalar;

pub use edwards::EdwardsPoint;
pub use field::FieldElement;
pub use montgomery::{scalarmult, scalarmult_base, x25519};
pub use scalar::Scalar;
