//! Float <-> i32 mapping used by the grid accumulators.
//!
//! Scatter passes add into shared cells from many particles at once. Integer
//! atomic add is commutative and associative, so each contribution is scaled
//! by [`FIXED_POINT_SCALE`] and rounded before the add, and divided back out
//! when a pass reads the cell.
//!
//! The intermediate math is done in f64 so a round trip is exact to within
//! `1 / FIXED_POINT_SCALE` over the whole working range of the grid.

pub const FIXED_POINT_SCALE: f64 = 1.0e7;

#[inline]
pub fn encode(value: f32) -> i32 {
    // `as` saturates, so a runaway value clips instead of wrapping.
    (value as f64 * FIXED_POINT_SCALE).round() as i32
}

#[inline]
pub fn decode(value: i32) -> f32 {
    (value as f64 / FIXED_POINT_SCALE) as f32
}
