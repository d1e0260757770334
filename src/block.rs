//! A logically rectangular block of the global grid.

use crate::boundary::*;
use crate::derivative::{self, ElasticKernel};
use crate::error::*;
use crate::fields::*;
use crate::grid::*;
use crate::initial_conditions::{generate_ic, ICType};
use crate::interface::InterfaceSide;
use crate::material::Material;
use crate::partition::*;
use crate::stencil::*;
use crate::surface::*;
use crate::topology::*;
use crate::util::*;

/// Everything needed to build a [`Block`].
pub struct BlockSetup {
    pub index: usize,
    pub kernel: ElasticKernel,
    /// Global point counts.
    pub nx: Coord3,
    /// Global index of the first point.
    pub xm: Coord3,
    pub material: Material,
    /// One per face, `2 * ndim` in total.
    pub boundaries: Vec<BoundaryKind>,
    /// One per face, `2 * ndim` in total.
    pub surfaces: Vec<Box<dyn Surface>>,
}

pub struct Block {
    index: usize,
    kernel: ElasticKernel,
    coord: BlockCoord,
    material: Material,
    dx: [f64; 3],
    regions: [StencilRegions; 3],
    surfaces: Vec<Box<dyn Surface>>,
    boundaries: Vec<Boundary>,
    degeneracies: Vec<Degeneracy>,
}

impl Block {
    /// Partition the block, set its grid and build its boundaries.
    ///
    /// Collective: every process builds every block, in the same order,
    /// whether or not it owns any of it.
    pub fn new<T: Topology>(
        setup: BlockSetup,
        sbp: &SbpOperator,
        fields: &mut Fields,
        topology: &T,
    ) -> SolverResult<Self> {
        let ndim = setup.kernel.ndim();
        setup.material.validate()?;
        if setup.boundaries.len() != 2 * ndim {
            return Err(SolverError::Config(format!(
                "block {} has {} boundary kinds, expected {}",
                setup.index,
                setup.boundaries.len(),
                2 * ndim
            )));
        }
        check_faces(ndim, &setup.nx, &setup.surfaces)?;

        let (coord, no_data) = partition(setup.nx, setup.xm, topology.window(), ndim, sbp)?;
        let regions = std::array::from_fn(|d| {
            StencilRegions::new(
                coord.xm[d],
                coord.nx[d],
                coord.xm_loc[d],
                coord.nx_loc[d],
                sbp.closure_rows(),
            )
        });
        let dx = std::array::from_fn(|d| {
            if d < ndim {
                1.0 / (coord.nx[d] - 1) as f64
            } else {
                1.0
            }
        });

        let degeneracies = set_grid(
            &GridInput {
                block: setup.index,
                ndim,
                coord: &coord,
                regions: &regions,
                dx: &dx,
                surfaces: &setup.surfaces,
                sbp,
            },
            fields,
            topology,
        )?;

        let boundaries = (0..2 * ndim)
            .map(|location| {
                let (offset, n_loc) = coord.face_window(location / 2);
                let local = LocalSurface::new(setup.surfaces[location].as_ref(), offset, n_loc);
                Boundary::new(
                    location,
                    setup.boundaries[location],
                    setup.kernel,
                    &coord,
                    &dx,
                    &local,
                    fields,
                    &setup.material,
                    sbp,
                )
            })
            .collect();

        if no_data {
            log::debug!("block {}: no local data", setup.index);
        } else {
            log::info!(
                "block {}: {:?} points at {:?}, owning {:?} from {:?}",
                setup.index,
                coord.nx.as_slice(),
                coord.xm.as_slice(),
                coord.nx_loc.as_slice(),
                coord.xm_loc.as_slice()
            );
        }

        Ok(Block {
            index: setup.index,
            kernel: setup.kernel,
            coord,
            material: setup.material,
            dx,
            regions,
            surfaces: setup.surfaces,
            boundaries,
            degeneracies,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn coord(&self) -> &BlockCoord {
        &self.coord
    }

    pub fn nx(&self, d: usize) -> i32 {
        self.coord.nx[d]
    }

    pub fn nx_loc(&self, d: usize) -> i32 {
        self.coord.nx_loc[d]
    }

    pub fn xm(&self, d: usize) -> i32 {
        self.coord.xm[d]
    }

    pub fn xm_loc(&self, d: usize) -> i32 {
        self.coord.xm_loc[d]
    }

    pub fn xp(&self, d: usize) -> i32 {
        self.coord.xp(d)
    }

    pub fn xp_loc(&self, d: usize) -> i32 {
        self.coord.xp_loc(d)
    }

    pub fn no_data(&self) -> bool {
        self.coord.no_data()
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn cp(&self) -> f64 {
        self.material.cp()
    }

    pub fn cs(&self) -> f64 {
        self.material.cs()
    }

    pub fn zp(&self) -> f64 {
        self.material.zp()
    }

    pub fn zs(&self) -> f64 {
        self.material.zs()
    }

    /// Reference grid spacing, `1 / (nx - 1)` in differenced dimensions.
    pub fn dx(&self, d: usize) -> f64 {
        self.dx[d]
    }

    pub fn surface(&self, location: usize) -> &dyn Surface {
        self.surfaces[location].as_ref()
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Points whose mapping folded, found while setting the grid.
    pub fn degeneracies(&self) -> &[Degeneracy] {
        &self.degeneracies
    }

    pub fn interface_side(&self) -> InterfaceSide<'_> {
        InterfaceSide {
            block: self.index,
            coord: &self.coord,
            dx: &self.dx,
            material: &self.material,
        }
    }

    pub fn set_initial_state(&self, ic: &ICType, fields: &mut Fields) {
        if let Some(owned) = self.coord.owned() {
            generate_ic(ic, self.kernel, &owned, fields);
        }
    }

    /// Accumulate `dt` times the interior right-hand side into `fields.df`.
    pub fn calc_df(&self, dt: f64, sbp: &SbpOperator, fields: &mut Fields) {
        if self.no_data() {
            return;
        }
        derivative::calc_df(self.kernel, &self.regions, &self.dx, &self.material, sbp, dt, fields);
    }

    /// Add the outer-face penalties into `fields.df`.
    pub fn set_boundaries(&self, dt: f64, fields: &mut Fields) {
        for b in &self.boundaries {
            b.apply_bcs(dt, fields);
        }
    }
}
