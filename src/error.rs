use crate::util::*;

/// Conditions that must stop the whole distributed run.
///
/// Every process reaches the same collective calls in the same order, so a
/// rank that hits one of these cannot simply skip ahead; callers are expected
/// to hand the error to [`crate::topology::Topology::abort`].
#[derive(thiserror::Error, Debug)]
pub enum SolverError {
    #[error("invalid problem dimension {ndim} with mode {mode}")]
    InvalidMode { ndim: usize, mode: usize },

    #[error("unsupported SBP order {0}, expected 2 or 3")]
    UnsupportedOrder(usize),

    #[error("dimension {dim} has non-positive extent {nx}")]
    NonPositiveExtent { dim: usize, nx: i64 },

    #[error("dimension {dim} has {nx} points, SBP closures need at least {min}")]
    BlockTooSmall { dim: usize, nx: i32, min: i32 },

    #[error(
        "process boundary at index {cut} in dimension {dim} falls inside \
         the boundary closure of block [{xm}, {xp}]"
    )]
    ClosureSplit { dim: usize, cut: i32, xm: i32, xp: i32 },

    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    #[error("surfaces {a} and {b} do not share an edge")]
    SurfaceMismatch { a: usize, b: usize },

    #[error("surface {location} has {found:?} points, block face has {expected:?}")]
    SurfaceSize {
        location: usize,
        found: [usize; 2],
        expected: [usize; 2],
    },

    #[error(
        "interface between blocks {block_a} and {block_b} in direction \
         {direction}: {what} ({left} vs {right})"
    )]
    InterfaceMismatch {
        block_a: usize,
        block_b: usize,
        direction: usize,
        what: &'static str,
        left: i32,
        right: i32,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("ghost exchange failed: {0}")]
    Exchange(String),

    #[error("output failed: {0}")]
    Output(String),

    #[error(transparent)]
    Ron(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type SolverResult<T> = Result<T, SolverError>;

/// A grid point whose mapping is not invertible.
///
/// These are reported, not returned as errors: the point keeps a zero metric
/// and is skipped by the velocity update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Degeneracy {
    pub block: usize,
    pub coord: Coord3,
    pub jacobian: f64,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "block {} point ({}, {}, {}) has jacobian {:e}",
            self.block,
            self.coord[0],
            self.coord[1],
            self.coord[2],
            self.jacobian
        )
    }
}
