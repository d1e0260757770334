//! Problem description, read from and written to RON.

use crate::boundary::BoundaryKind;
use crate::derivative::ElasticKernel;
use crate::error::*;
use crate::initial_conditions::ICType;
use crate::interface::InterfaceKind;
use crate::material::Material;
use crate::stencil::SbpOperator;
use crate::surface::Surface;
use crate::util::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One block of the layout, a box `[corner, corner + lengths]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default)]
    pub material: Material,
    /// One per face, `2 * ndim` entries. Faces shared with another block are
    /// overridden by the interface.
    pub boundaries: Vec<BoundaryKind>,
    pub corner: [f64; 3],
    pub lengths: [f64; 3],
}

/// Contact law of the interface between two adjacent blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub block_a: usize,
    pub block_b: usize,
    pub kind: InterfaceKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for VTK files, one per block, rank and snapshot.
    pub vtk_dir: Option<PathBuf>,
    /// Directory for PNG frames of a 2D problem, one per rank and snapshot.
    pub png_dir: Option<PathBuf>,
    /// State component shown in the PNG.
    pub component: usize,
    /// Steps between snapshots, `0` for the final state only.
    pub every: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub ndim: usize,
    /// 2 for in-plane, 3 for anti-plane. Ignored in 3D.
    pub mode: usize,
    pub sbp_order: usize,
    /// Point counts of the blocks along each dimension. The global grid has
    /// `nx_block[0].len() * nx_block[1].len() * nx_block[2].len()` blocks,
    /// numbered with the last dimension fastest.
    pub nx_block: [Vec<i32>; 3],
    pub blocks: Vec<BlockConfig>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
    pub nt: usize,
    /// Courant number used when `dt` is not given.
    pub cfl: f64,
    #[serde(default)]
    pub dt: Option<f64>,
    #[serde(default)]
    pub initial_condition: ICType,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ProblemConfig {
    /// A pulse in a unit square with absorbing edges.
    fn default() -> Self {
        ProblemConfig {
            ndim: 2,
            mode: 2,
            sbp_order: 2,
            nx_block: [vec![101], vec![101], vec![1]],
            blocks: vec![BlockConfig {
                material: Material::default(),
                boundaries: vec![BoundaryKind::Absorbing; 4],
                corner: [0.0; 3],
                lengths: [1.0, 1.0, 0.0],
            }],
            interfaces: Vec::new(),
            nt: 100,
            cfl: 0.3,
            dt: None,
            initial_condition: ICType::reference_pulse(),
            output: OutputConfig::default(),
        }
    }
}

impl ProblemConfig {
    pub fn from_ron_str(s: &str) -> SolverResult<Self> {
        let config: ProblemConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> SolverResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SolverError::Output(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> SolverResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> SolverResult<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    pub fn kernel(&self) -> SolverResult<ElasticKernel> {
        ElasticKernel::new(self.ndim, self.mode)
    }

    pub fn sbp(&self) -> SolverResult<SbpOperator> {
        SbpOperator::new(self.sbp_order)
    }

    /// Number of blocks along each dimension.
    pub fn block_counts(&self) -> [usize; 3] {
        std::array::from_fn(|d| self.nx_block[d].len())
    }

    /// Global grid size, all blocks together.
    pub fn global_nx(&self) -> Coord3 {
        Coord3::from_fn(|d, _| self.nx_block[d].iter().sum())
    }

    /// Block position in the layout, last dimension fastest.
    pub fn block_position(&self, index: usize) -> [usize; 3] {
        let nb = self.block_counts();
        [index / (nb[1] * nb[2]), (index / nb[2]) % nb[1], index % nb[2]]
    }

    pub fn block_index(&self, position: [usize; 3]) -> usize {
        let nb = self.block_counts();
        (position[0] * nb[1] + position[1]) * nb[2] + position[2]
    }

    /// Global extent and first index of block `index`.
    pub fn block_extent(&self, index: usize) -> (Coord3, Coord3) {
        let position = self.block_position(index);
        let nx = Coord3::from_fn(|d, _| self.nx_block[d][position[d]]);
        let xm = Coord3::from_fn(|d, _| self.nx_block[d][..position[d]].iter().sum());
        (nx, xm)
    }

    pub fn interface_kind(&self, block_a: usize, block_b: usize) -> InterfaceKind {
        self.interfaces
            .iter()
            .find(|i| i.block_a == block_a && i.block_b == block_b)
            .map(|i| i.kind)
            .unwrap_or_default()
    }

    /// Explicit `dt`, or the Courant number times the smallest distance
    /// between neighbouring face points over P-wave speed. Every process
    /// holds all faces, so all of them agree.
    pub fn time_step(&self, surfaces: &[Vec<Box<dyn Surface>>]) -> f64 {
        if let Some(dt) = self.dt {
            return dt;
        }
        let mut limit = f64::INFINITY;
        for (block, faces) in self.blocks.iter().zip(surfaces) {
            for face in faces {
                limit = limit.min(face.min_spacing() / block.material.cp());
            }
        }
        self.cfl * limit
    }

    pub fn validate(&self) -> SolverResult<()> {
        self.kernel()?;
        self.sbp()?;

        for d in 0..NDIM_MAX {
            if self.nx_block[d].is_empty() {
                return Err(SolverError::Config(format!("no blocks along dimension {}", d)));
            }
            if d >= self.ndim && self.nx_block[d] != [1] {
                return Err(SolverError::Config(format!(
                    "dimension {} of a {}D problem must be a single point",
                    d, self.ndim
                )));
            }
            if let Some(nx) = self.nx_block[d].iter().find(|n| **n <= 0) {
                return Err(SolverError::NonPositiveExtent {
                    dim: d,
                    nx: *nx as i64,
                });
            }
        }

        let nblocks: usize = self.block_counts().iter().product();
        if self.blocks.len() != nblocks {
            return Err(SolverError::Config(format!(
                "layout has {} blocks, {} given",
                nblocks,
                self.blocks.len()
            )));
        }
        for (index, block) in self.blocks.iter().enumerate() {
            block.material.validate()?;
            if block.boundaries.len() != 2 * self.ndim {
                return Err(SolverError::Config(format!(
                    "block {} has {} boundary kinds, expected {}",
                    index,
                    block.boundaries.len(),
                    2 * self.ndim
                )));
            }
            if (0..self.ndim).any(|d| !(block.lengths[d] > 0.0)) {
                return Err(SolverError::Config(format!(
                    "block {} has non-positive lengths {:?}",
                    index, block.lengths
                )));
            }
        }

        for i in &self.interfaces {
            if i.block_a >= nblocks || i.block_b >= nblocks {
                return Err(SolverError::Config(format!(
                    "interface {} -> {} names a missing block",
                    i.block_a, i.block_b
                )));
            }
            let (pa, pb) = (self.block_position(i.block_a), self.block_position(i.block_b));
            let steps: Vec<usize> = (0..NDIM_MAX).filter(|d| pa[*d] != pb[*d]).collect();
            if steps.len() != 1 || pb[steps[0]] != pa[steps[0]] + 1 {
                return Err(SolverError::Config(format!(
                    "blocks {} and {} are not adjacent",
                    i.block_a, i.block_b
                )));
            }
        }

        if self.dt.is_none() && !(self.cfl > 0.0) {
            return Err(SolverError::Config(format!("cfl must be positive, got {}", self.cfl)));
        }
        if let Some(dt) = self.dt {
            if !(dt > 0.0) {
                return Err(SolverError::Config(format!("dt must be positive, got {}", dt)));
            }
        }
        Ok(())
    }
}
