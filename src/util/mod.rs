pub use num_traits::{One, Zero};

mod aabb;
pub mod indexing;
pub use aabb::*;

/// Global grid index. Problems are always addressed in three dimensions,
/// a 2D problem simply has a single point along the last axis.
pub type Coord<const GRID_DIMENSION: usize> =
    nalgebra::SVector<i32, { GRID_DIMENSION }>;

/// Per dimension `[min, max]` pairs, inclusive.
pub type Bounds<const GRID_DIMENSION: usize> =
    nalgebra::SMatrix<i32, { GRID_DIMENSION }, 2>;

pub type Coord3 = Coord<3>;

pub use nalgebra::{matrix, vector, Matrix3, Vector3};

/// Number of spatial dimensions the solver addresses.
pub const NDIM_MAX: usize = 3;
