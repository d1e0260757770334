use crate::util::*;

/// What one process owns of the global index space.
///
/// Ghost widths are nonzero only at process cuts, the global domain edges
/// carry no ghost layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessWindow {
    /// Global point count per dimension.
    pub nx: Coord3,
    pub xm_loc: Coord3,
    pub nx_loc: Coord3,
    pub xm_ghost: Coord3,
    pub xp_ghost: Coord3,
}

impl ProcessWindow {
    /// A single process owning everything.
    pub fn whole(nx: Coord3) -> Self {
        ProcessWindow {
            nx,
            xm_loc: Coord3::zero(),
            nx_loc: nx,
            xm_ghost: Coord3::zero(),
            xp_ghost: Coord3::zero(),
        }
    }

    pub fn xp_loc(&self, d: usize) -> i32 {
        self.xm_loc[d] + self.nx_loc[d] - 1
    }

    pub fn owned(&self) -> AABB<3> {
        AABB::from_mm(self.xm_loc, self.xm_loc + self.nx_loc.add_scalar(-1))
    }

    /// The box covered by this process's field buffers.
    pub fn buffer(&self) -> AABB<3> {
        AABB::from_mm(
            self.xm_loc - self.xm_ghost,
            self.xm_loc + self.nx_loc.add_scalar(-1) + self.xp_ghost,
        )
    }
}
