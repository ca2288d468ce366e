//! N-dimensional sample points
//!
//! A [`Point`] carries `N` coordinates and a scalar value. Coordinate
//! comparisons are tolerance-based except for the raw per-axis `<` used
//! when descending a spatial index, and distances widen before
//! subtracting so they cannot overflow.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};
use crate::numeric::{convert, Coord, Scalar, Value};

/// A sample point: `N` coordinates of type `C` plus a scalar value `V`.
#[derive(Debug, Clone, Copy)]
pub struct Point<C: Coord, V: Value, const N: usize> {
    coords: [C; N],
    value: V,
}

impl<C: Coord, V: Value, const N: usize> Default for Point<C, V, N> {
    fn default() -> Self {
        Self {
            coords: [C::default(); N],
            value: V::default(),
        }
    }
}

impl<C: Coord, V: Value, const N: usize> Point<C, V, N> {
    pub fn new(coords: [C; N], value: V) -> Self {
        Self { coords, value }
    }

    /// Build a point from an ordered coordinate sequence: extra
    /// coordinates are truncated, missing ones are zero.
    pub fn from_coords(coords: &[C], value: V) -> Self {
        let mut own = [C::default(); N];
        for (dst, src) in own.iter_mut().zip(coords) {
            *dst = *src;
        }

        Self { coords: own, value }
    }

    /// Number of coordinate axes, fixed per type.
    pub const fn axis_count() -> usize {
        N
    }

    /// The coordinate on one axis.
    pub fn coord(&self, axis: usize) -> Result<C> {
        if axis >= N {
            return Err(Error::AxisOutOfRange { axis, axes: N });
        }

        Ok(self.coords[axis])
    }

    pub fn coords(&self) -> &[C; N] {
        &self.coords
    }

    pub fn value(&self) -> V {
        self.value
    }

    pub fn set_value(&mut self, value: V) {
        self.value = value;
    }

    /// Set the value from any scalar, converting with the magnitude
    /// rule for signed-to-unsigned casts.
    pub fn set_value_from<U: Scalar>(&mut self, value: U) {
        self.value = convert(value);
    }

    /// Tolerance equality over coordinates only.
    pub fn near_eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(&other.coords)
            .all(|(a, b)| a.near_eq(*b))
    }

    /// Tolerance equality over coordinates and value.
    pub fn exactly_eq(&self, other: &Self) -> bool {
        self.near_eq(other) && self.value.near_eq(other.value)
    }

    /// Lexicographic ordering over coordinates: the first axis that is
    /// not tolerance-equal decides; equal throughout is not less.
    pub fn less_lex(&self, other: &Self) -> bool {
        for (a, b) in self.coords.iter().zip(&other.coords) {
            if a.near_eq(*b) {
                continue;
            }

            return a < b;
        }

        false
    }

    /// Strict single-axis `<`, without tolerance. Coordinates must not
    /// be NaN where a total order is required.
    pub fn less_on_axis(&self, other: &Self, axis: usize) -> Result<bool> {
        if axis >= N {
            return Err(Error::AxisOutOfRange { axis, axes: N });
        }

        Ok(self.coords[axis] < other.coords[axis])
    }

    /// Total single-axis ordering used when sorting slices of points.
    pub fn cmp_on_axis(&self, other: &Self, axis: usize) -> Result<Ordering> {
        if axis >= N {
            return Err(Error::AxisOutOfRange { axis, axes: N });
        }

        Ok(self.coords[axis]
            .partial_cmp(&other.coords[axis])
            .unwrap_or(Ordering::Equal))
    }

    /// Signed single-axis difference, widened so the subtraction cannot
    /// overflow.
    pub fn axis_distance(&self, other: &Self, axis: usize) -> Result<C::Wide> {
        if axis >= N {
            return Err(Error::AxisOutOfRange { axis, axes: N });
        }

        Ok(self.coords[axis].wide_diff(other.coords[axis]))
    }

    /// Euclidean distance: squared widened differences accumulate in
    /// the widest type available before the square root.
    pub fn distance(&self, other: &Self) -> f64 {
        let mut sum = C::Accum::default();
        for (a, b) in self.coords.iter().zip(&other.coords) {
            sum += C::sq_to_accum(a.wide_diff(*b));
        }

        C::accum_to_f64(sum).sqrt()
    }

    /// Convert into a point with other scalar types or axis count.
    /// Coordinates follow the magnitude rule for signed-to-unsigned
    /// casts; extra axes are truncated and missing ones are zero.
    pub fn convert<C2: Coord, V2: Value, const M: usize>(&self) -> Point<C2, V2, M> {
        let mut coords = [C2::default(); M];
        for (dst, src) in coords.iter_mut().zip(&self.coords) {
            *dst = convert(*src);
        }

        Point {
            coords,
            value: convert(self.value),
        }
    }
}

impl<C: Coord, V: Value, const N: usize> fmt::Display for Point<C, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, coord) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{coord}")?;
        }

        write!(f, ") = {}", self.value)
    }
}

/// Capabilities a spatial index needs from its items.
///
/// Distances surface as `f64` at this seam; both sides of any search
/// comparison are coerced to it.
pub trait SpatialItem: Clone {
    /// Number of coordinate axes.
    fn axis_count() -> usize;

    /// Total per-axis ordering used when sorting during bulk builds.
    fn cmp_on_axis(&self, other: &Self, axis: usize) -> Result<Ordering>;

    /// Strict per-axis `<` used when descending an index.
    fn less_on_axis(&self, other: &Self, axis: usize) -> Result<bool> {
        Ok(self.cmp_on_axis(other, axis)? == Ordering::Less)
    }

    /// Tolerance equality over coordinates only.
    fn near_eq(&self, other: &Self) -> bool;

    /// Signed single-axis distance.
    fn axis_distance_f64(&self, other: &Self, axis: usize) -> Result<f64>;

    /// Euclidean distance over all axes.
    fn distance(&self, other: &Self) -> f64;

    fn value_f64(&self) -> f64;

    fn set_value_f64(&mut self, value: f64);

    /// Copy the value (not the coordinates) from another item.
    fn copy_value_from(&mut self, other: &Self);
}

impl<C: Coord, V: Value, const N: usize> SpatialItem for Point<C, V, N> {
    fn axis_count() -> usize {
        N
    }

    fn cmp_on_axis(&self, other: &Self, axis: usize) -> Result<Ordering> {
        Point::cmp_on_axis(self, other, axis)
    }

    fn less_on_axis(&self, other: &Self, axis: usize) -> Result<bool> {
        Point::less_on_axis(self, other, axis)
    }

    fn near_eq(&self, other: &Self) -> bool {
        Point::near_eq(self, other)
    }

    fn axis_distance_f64(&self, other: &Self, axis: usize) -> Result<f64> {
        Ok(C::wide_to_f64(self.axis_distance(other, axis)?))
    }

    fn distance(&self, other: &Self) -> f64 {
        Point::distance(self, other)
    }

    fn value_f64(&self) -> f64 {
        self.value.to_f64()
    }

    fn set_value_f64(&mut self, value: f64) {
        self.set_value_from(value);
    }

    fn copy_value_from(&mut self, other: &Self) {
        self.value = other.value;
    }
}
