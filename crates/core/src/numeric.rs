//! Tolerance comparisons and widening numeric casts
//!
//! Coordinate arithmetic widens before subtracting, so an axis
//! difference can never overflow, and squared differences accumulate in
//! the widest unsigned (or floating) type available. Floating-point
//! comparisons use a tolerance of `max(1e-8, machine epsilon)`.

use std::fmt::{Debug, Display};
use std::ops::AddAssign;

use num_traits::NumCast;

/// Comparison tolerance for a floating-point type: the larger of 1e-8
/// and the type's machine epsilon.
pub trait Tolerance {
    const TOLERANCE: Self;
}

impl Tolerance for f32 {
    // f32 machine epsilon exceeds 1e-8
    const TOLERANCE: f32 = f32::EPSILON;
}

impl Tolerance for f64 {
    const TOLERANCE: f64 = 1.0e-8;
}

/// Trait for types usable as point coordinates or values.
///
/// Bounds the arithmetic primitives and adds the sign-aware operations
/// the rest of the crate builds on.
pub trait Scalar:
    Copy + Clone + Debug + Display + Default + PartialOrd + PartialEq + NumCast + Send + Sync + 'static
{
    /// Whether the type can represent negative values
    const SIGNED: bool;

    /// Absolute value for signed types, identity for unsigned ones
    fn magnitude(self) -> Self;

    /// Tolerance equality: exact for integers, `|x - y| < TOLERANCE` for floats
    fn near_eq(self, other: Self) -> bool;

    /// Tolerance zero test
    fn near_zero(self) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> f64;

    /// Convert self to a JSON number of matching kind
    fn to_json(self) -> serde_json::Value;
}

/// Lossy scalar conversion. A signed source aimed at an unsigned
/// destination goes through its absolute value first, so the cast
/// cannot wrap; values outside the destination range fall back to zero.
pub fn convert<S: Scalar, D: Scalar>(value: S) -> D {
    let value = if S::SIGNED && !D::SIGNED {
        value.magnitude()
    } else {
        value
    };

    num_traits::cast(value).unwrap_or_default()
}

/// A coordinate type: a [`Scalar`] with the widening machinery needed
/// for overflow-free distance computation.
pub trait Coord: Scalar {
    /// Signed type wide enough to hold the difference of any two values
    type Wide: Copy + PartialOrd + Default + Debug + Display;

    /// Accumulator for sums of squared differences
    type Accum: Copy + Default + AddAssign + Debug;

    /// Widened subtraction `self - other`
    fn wide_diff(self, other: Self) -> Self::Wide;

    /// A widened difference as f64, sign preserved
    fn wide_to_f64(wide: Self::Wide) -> f64;

    /// Square a widened difference into the accumulator type
    fn sq_to_accum(wide: Self::Wide) -> Self::Accum;

    /// An accumulated sum as f64
    fn accum_to_f64(accum: Self::Accum) -> f64;
}

macro_rules! impl_scalar_signed_int {
    ($t:ty) => {
        impl Scalar for $t {
            const SIGNED: bool = true;

            fn magnitude(self) -> Self {
                self.wrapping_abs()
            }

            fn near_eq(self, other: Self) -> bool {
                self == other
            }

            fn near_zero(self) -> bool {
                self == 0
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_json(self) -> serde_json::Value {
                serde_json::Value::from(self)
            }
        }
    };
}

macro_rules! impl_scalar_unsigned_int {
    ($t:ty) => {
        impl Scalar for $t {
            const SIGNED: bool = false;

            fn magnitude(self) -> Self {
                self
            }

            fn near_eq(self, other: Self) -> bool {
                self == other
            }

            fn near_zero(self) -> bool {
                self == 0
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_json(self) -> serde_json::Value {
                serde_json::Value::from(self)
            }
        }
    };
}

macro_rules! impl_scalar_float {
    ($t:ty) => {
        impl Scalar for $t {
            const SIGNED: bool = true;

            fn magnitude(self) -> Self {
                self.abs()
            }

            fn near_eq(self, other: Self) -> bool {
                (self - other).abs() < <$t as Tolerance>::TOLERANCE
            }

            fn near_zero(self) -> bool {
                self.abs() < <$t as Tolerance>::TOLERANCE
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_json(self) -> serde_json::Value {
                serde_json::Value::from(self)
            }
        }
    };
}

macro_rules! impl_coord_int {
    ($t:ty, $wide:ty) => {
        impl Coord for $t {
            type Wide = $wide;
            type Accum = u128;

            fn wide_diff(self, other: Self) -> $wide {
                self as $wide - other as $wide
            }

            fn wide_to_f64(wide: $wide) -> f64 {
                wide as f64
            }

            fn sq_to_accum(wide: $wide) -> u128 {
                let diff = wide.unsigned_abs() as u128;
                diff * diff
            }

            fn accum_to_f64(accum: u128) -> f64 {
                accum as f64
            }
        }
    };
}

macro_rules! impl_coord_float {
    ($t:ty) => {
        impl Coord for $t {
            type Wide = f64;
            type Accum = f64;

            fn wide_diff(self, other: Self) -> f64 {
                self as f64 - other as f64
            }

            fn wide_to_f64(wide: f64) -> f64 {
                wide
            }

            fn sq_to_accum(wide: f64) -> f64 {
                wide * wide
            }

            fn accum_to_f64(accum: f64) -> f64 {
                accum
            }
        }
    };
}

impl_scalar_signed_int!(i8);
impl_scalar_signed_int!(i16);
impl_scalar_signed_int!(i32);
impl_scalar_signed_int!(i64);
impl_scalar_unsigned_int!(u8);
impl_scalar_unsigned_int!(u16);
impl_scalar_unsigned_int!(u32);
impl_scalar_unsigned_int!(u64);
impl_scalar_float!(f32);
impl_scalar_float!(f64);

impl_coord_int!(i8, i16);
impl_coord_int!(i16, i32);
impl_coord_int!(i32, i64);
impl_coord_int!(i64, i128);
impl_coord_int!(u8, i16);
impl_coord_int!(u16, i32);
impl_coord_int!(u32, i64);
impl_coord_int!(u64, i128);
impl_coord_float!(f32);
impl_coord_float!(f64);

/// Marker for types usable as the scalar value of a point.
pub trait Value: Scalar {}

impl<T: Scalar> Value for T {}
