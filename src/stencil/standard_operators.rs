//! Coefficient tables for the diagonal-norm SBP first derivative.
//!
//! Closure rows are listed by distance from the boundary and read from the
//! boundary point outward. The right closure is obtained by reversing and
//! negating these rows, see [`crate::stencil::StencilRegions`].

/// Second order interior, first order closure.
pub const SBP2_INTERIOR: [f64; 3] = [-0.5, 0.0, 0.5];

pub const SBP2_CLOSURE: [[f64; 3]; 2] = [[-1.0, 1.0, 0.0], [-0.5, 0.0, 0.5]];

pub const SBP2_H0: f64 = 0.5;

/// Fourth order interior, second order closure.
pub const SBP4_INTERIOR: [f64; 5] =
    [1.0 / 12.0, -2.0 / 3.0, 0.0, 2.0 / 3.0, -1.0 / 12.0];

pub const SBP4_CLOSURE: [[f64; 6]; 4] = [
    [-24.0 / 17.0, 59.0 / 34.0, -4.0 / 17.0, -3.0 / 34.0, 0.0, 0.0],
    [-0.5, 0.0, 0.5, 0.0, 0.0, 0.0],
    [4.0 / 43.0, -59.0 / 86.0, 0.0, 59.0 / 86.0, -4.0 / 43.0, 0.0],
    [3.0 / 98.0, 0.0, -59.0 / 98.0, 0.0, 32.0 / 49.0, -4.0 / 49.0],
];

pub const SBP4_H0: f64 = 17.0 / 48.0;
