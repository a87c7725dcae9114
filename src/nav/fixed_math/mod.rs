//! Deterministic fixed-point mathematics.
//!
//! Every cost, distance, direction and velocity in the navigation subsystem is a
//! [`FixedNum`]. Two machines given the same terrain and the same requests produce
//! bit-identical paths, flow fields and steering velocities, which lockstep
//! multiplayer depends on.

use fixed::types::I48F16;

pub use vec2::FixedVec2;

mod vec2;

/// Fixed-point number type used throughout navigation.
///
/// I48F16: 48 integer bits, 16 fractional bits, precision ~0.000015. Squares of
/// small values underflow at this width, so [`FixedVec2::length`] widens first.
pub type FixedNum = I48F16;

/// √2, the diagonal step multiplier.
pub const SQRT_2: FixedNum = FixedNum::SQRT_2;

/// Stand-in for an infinite cost (unreachable cell).
pub const INFINITY: FixedNum = FixedNum::MAX;
