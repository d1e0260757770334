use crate::error::*;
use crate::stencil::*;
use crate::topology::*;
use crate::util::*;

/// Where a block sits in the global index space, and which part of it this
/// process owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCoord {
    pub nx: Coord3,
    pub xm: Coord3,
    pub nx_loc: Coord3,
    pub xm_loc: Coord3,
    pub xm_ghost: Coord3,
    pub xp_ghost: Coord3,
}

impl BlockCoord {
    pub fn xp(&self, d: usize) -> i32 {
        self.xm[d] + self.nx[d] - 1
    }

    pub fn xp_loc(&self, d: usize) -> i32 {
        self.xm_loc[d] + self.nx_loc[d] - 1
    }

    pub fn no_data(&self) -> bool {
        self.nx_loc.iter().any(|n| *n == 0)
    }

    pub fn aabb(&self) -> AABB<3> {
        AABB::from_mm(self.xm, self.xm + self.nx.add_scalar(-1))
    }

    /// Owned points, `None` when the process has no data for this block.
    pub fn owned(&self) -> Option<AABB<3>> {
        if self.no_data() {
            None
        } else {
            Some(AABB::from_mm(
                self.xm_loc,
                self.xm_loc + self.nx_loc.add_scalar(-1),
            ))
        }
    }

    /// Owned points on face `location`, `None` unless this process holds
    /// that edge of the block.
    pub fn face(&self, location: usize) -> Option<AABB<3>> {
        let d = location / 2;
        let owned = self.owned()?;
        let edge = if location % 2 == 0 { self.xm[d] } else { self.xp(d) };
        if edge < owned.min()[d] || edge > owned.max()[d] {
            return None;
        }
        Some(owned.slab(d, edge, edge))
    }

    /// Offset of the owned window from the block minimum and its size,
    /// along the two dimensions spanning faces normal to `direction`.
    pub fn face_window(&self, direction: usize) -> ([usize; 2], [usize; 2]) {
        let dims = crate::surface::face_dims(direction);
        (
            dims.map(|a| (self.xm_loc[a] - self.xm[a]) as usize),
            dims.map(|a| self.nx_loc[a] as usize),
        )
    }

    /// Owned points plus the ghost layers that fall inside the block.
    pub fn owned_with_ghosts(&self) -> Option<AABB<3>> {
        let owned = self.owned()?;
        let widened = AABB::from_mm(
            owned.min() - self.xm_ghost,
            owned.max() + self.xp_ghost,
        );
        widened.intersection(&self.aabb())
    }
}

/// Intersect a block `[xm, xm + nx - 1]` with the process window.
///
/// Returns the block coordinate descriptor and whether this process owns no
/// part of the block. Ghost widths are `s - 1` at cuts inside the block and
/// `1` for the layer just past a block edge.
pub fn partition(
    nx: Coord3,
    xm: Coord3,
    window: &ProcessWindow,
    ndim: usize,
    sbp: &SbpOperator,
) -> SolverResult<(BlockCoord, bool)> {
    let closure = sbp.closure_rows();
    let ghost = sbp.ghost_width();

    let mut c = BlockCoord {
        nx,
        xm,
        nx_loc: Coord3::zero(),
        xm_loc: xm,
        xm_ghost: Coord3::zero(),
        xp_ghost: Coord3::zero(),
    };

    for d in 0..NDIM_MAX {
        if nx[d] <= 0 {
            return Err(SolverError::NonPositiveExtent {
                dim: d,
                nx: nx[d] as i64,
            });
        }
        if d >= ndim && nx[d] != 1 {
            return Err(SolverError::Config(format!(
                "dimension {} of a {}D problem must have one point, got {}",
                d, ndim, nx[d]
            )));
        }
        if d < ndim && nx[d] < 2 * closure {
            return Err(SolverError::BlockTooSmall {
                dim: d,
                nx: nx[d],
                min: 2 * closure,
            });
        }

        let xp = c.xp(d);
        let lo = window.xm_loc[d];
        let hi = window.xp_loc(d);

        if lo <= xm[d] && hi >= xp {
            // block inside window
            c.nx_loc[d] = nx[d];
            c.xm_loc[d] = xm[d];
        } else if lo > xm[d] && lo <= xp && hi >= xp {
            // window clips the low side
            c.nx_loc[d] = xp - lo + 1;
            c.xm_loc[d] = lo;
        } else if lo <= xm[d] && hi < xp && hi >= xm[d] {
            // window clips the high side
            c.nx_loc[d] = hi - xm[d] + 1;
            c.xm_loc[d] = xm[d];
        } else if lo > xm[d] && hi < xp {
            // window inside block
            c.nx_loc[d] = window.nx_loc[d];
            c.xm_loc[d] = lo;
        } else {
            c.nx_loc[d] = 0;
        }

        if lo > xm[d] && lo < xp {
            // cut inside block, closure-deep ghosts below the window
            c.xm_ghost[d] = ghost;
        } else if lo == xp + 1 {
            // window starts just past the block, one layer back to its last point
            c.xp_ghost[d] = 1;
        }
        if hi > xm[d] && hi < xp {
            // cut inside block, closure-deep ghosts above the window
            c.xp_ghost[d] = ghost;
        } else if hi == xm[d] - 1 {
            // window ends just before the block, one layer forward to its first point
            c.xm_ghost[d] = 1;
        }

        if d < ndim {
            // a cut before index `lo` or after index `hi` must leave whole
            // closures on both sides
            if lo > xm[d] && lo <= xp {
                check_cut(d, lo, xm[d], xp, closure)?;
            }
            if hi >= xm[d] && hi < xp {
                check_cut(d, hi + 1, xm[d], xp, closure)?;
            }
        }
    }

    let no_data = c.no_data();
    if no_data {
        c.nx_loc = Coord3::zero();
        c.xm_loc = xm;
    }
    Ok((c, no_data))
}

/// `cut` is the first index after the cut.
fn check_cut(dim: usize, cut: i32, xm: i32, xp: i32, closure: i32) -> SolverResult<()> {
    if cut - xm < closure || xp + 1 - cut < closure {
        return Err(SolverError::ClosureSplit { dim, cut, xm, xp });
    }
    Ok(())
}
