//! Multi-block problem and its time integrator.

use crate::block::*;
use crate::boundary::BoundaryKind;
use crate::config::ProblemConfig;
use crate::derivative::ElasticKernel;
use crate::error::*;
use crate::fields::Fields;
use crate::initial_conditions::ICType;
use crate::interface::Interface;
use crate::partition::partition;
use crate::stencil::SbpOperator;
use crate::surface::*;
use crate::topology::*;
use crate::util::*;

/// Low-storage three stage Runge-Kutta coefficients (Williamson 2N).
pub const RK_A: [f64; 3] = [0.0, -5.0 / 9.0, -153.0 / 128.0];
pub const RK_B: [f64; 3] = [1.0 / 3.0, 15.0 / 16.0, 8.0 / 15.0];

/// All blocks and interfaces of one process, over one shared field buffer.
pub struct Problem<'t, T: Topology> {
    topology: &'t T,
    sbp: SbpOperator,
    kernel: ElasticKernel,
    fields: Fields,
    blocks: Vec<Block>,
    interfaces: Vec<Interface>,
    dt: f64,
    t: f64,
    step: usize,
}

impl<'t, T: Topology> Problem<'t, T> {
    /// Planar blocks as described by `config`.
    pub fn new(config: &ProblemConfig, topology: &'t T) -> SolverResult<Self> {
        let surfaces = config
            .blocks
            .iter()
            .enumerate()
            .map(|(index, block)| {
                let (nx, _) = config.block_extent(index);
                PlanarSurface::box_faces(
                    config.ndim,
                    &nx,
                    Vector3::from(block.corner),
                    Vector3::from(block.lengths),
                )
            })
            .collect();
        Self::with_surfaces(config, surfaces, topology)
    }

    /// Blocks bounded by the given faces, `2 * ndim` per block. Materials,
    /// boundary kinds and the layout still come from `config`.
    ///
    /// Collective over the topology.
    pub fn with_surfaces(
        config: &ProblemConfig,
        surfaces: Vec<Vec<Box<dyn Surface>>>,
        topology: &'t T,
    ) -> SolverResult<Self> {
        config.validate()?;
        if surfaces.len() != config.blocks.len() {
            return Err(SolverError::Config(format!(
                "{} surface sets for {} blocks",
                surfaces.len(),
                config.blocks.len()
            )));
        }
        let global = config.global_nx();
        if topology.window().nx != global {
            return Err(SolverError::Config(format!(
                "topology covers {:?}, problem has {:?}",
                topology.window().nx.as_slice(),
                global.as_slice()
            )));
        }

        let kernel = config.kernel()?;
        let sbp = config.sbp()?;
        let ndim = config.ndim;
        let counts = config.block_counts();

        // Every process sees every cut, so a bad decomposition fails on all
        // of them before the first exchange.
        for index in 0..config.blocks.len() {
            let (nx, xm) = config.block_extent(index);
            for window in topology.windows() {
                partition(nx, xm, window, ndim, &sbp)?;
            }
        }
        let dt = config.time_step(&surfaces);
        let mut fields = Fields::new(ndim, kernel.nvar(), topology.window());

        let mut blocks = Vec::with_capacity(config.blocks.len());
        for (index, (block, faces)) in config.blocks.iter().zip(surfaces).enumerate() {
            let position = config.block_position(index);
            let (nx, xm) = config.block_extent(index);
            let mut boundaries = block.boundaries.clone();
            for d in 0..ndim {
                if position[d] > 0 {
                    boundaries[2 * d] = BoundaryKind::None;
                }
                if position[d] + 1 < counts[d] {
                    boundaries[2 * d + 1] = BoundaryKind::None;
                }
            }
            let setup = BlockSetup {
                index,
                kernel,
                nx,
                xm,
                material: block.material,
                boundaries,
                surfaces: faces,
            };
            blocks.push(Block::new(setup, &sbp, &mut fields, topology)?);
        }

        let mut interfaces = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            let position = config.block_position(index);
            for d in 0..ndim {
                if position[d] + 1 >= counts[d] {
                    continue;
                }
                let mut next = position;
                next[d] += 1;
                let other = &blocks[config.block_index(next)];
                interfaces.push(Interface::new(
                    d,
                    config.interface_kind(index, other.index()),
                    kernel,
                    &block.interface_side(),
                    &other.interface_side(),
                    block.surface(2 * d + 1),
                    &fields,
                    &sbp,
                )?);
            }
        }

        log::info!(
            "problem: {} blocks, {} interfaces, {:?} points, dt {:e}, rank {} of {}",
            blocks.len(),
            interfaces.len(),
            global.as_slice(),
            dt,
            topology.rank(),
            topology.size()
        );

        Ok(Problem {
            topology,
            sbp,
            kernel,
            fields,
            blocks,
            interfaces,
            dt,
            t: 0.0,
            step: 0,
        })
    }

    pub fn kernel(&self) -> ElasticKernel {
        self.kernel
    }

    pub fn sbp(&self) -> &SbpOperator {
        &self.sbp
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn topology(&self) -> &T {
        self.topology
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn set_dt(&mut self, dt: f64) {
        self.dt = dt;
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn step_count(&self) -> usize {
        self.step
    }

    /// Points with a folded mapping, over all local blocks.
    pub fn degeneracies(&self) -> impl Iterator<Item = &Degeneracy> + '_ {
        self.blocks.iter().flat_map(|b| b.degeneracies())
    }

    /// Set the state of every block and refresh ghosts. Collective.
    pub fn set_initial_state(&mut self, ic: &ICType) -> SolverResult<()> {
        for block in &self.blocks {
            block.set_initial_state(ic, &mut self.fields);
        }
        self.fields.exchange_fields(self.topology)
    }

    /// Accumulate `dt` times the full right-hand side into `df`: interior
    /// derivatives, then boundary and interface penalties.
    pub fn calc_df(&mut self) {
        for block in &self.blocks {
            block.calc_df(self.dt, &self.sbp, &mut self.fields);
        }
        for block in &self.blocks {
            block.set_boundaries(self.dt, &mut self.fields);
        }
        for interface in &self.interfaces {
            interface.apply_bcs(self.dt, &mut self.fields);
        }
    }

    /// One Runge-Kutta step. Collective.
    pub fn step(&mut self) -> SolverResult<()> {
        profiling::scope!("rk_step");
        for stage in 0..RK_A.len() {
            log::debug!("step {} stage {}", self.step, stage);
            self.fields.scale_df(RK_A[stage]);
            self.calc_df();
            self.fields.update(RK_B[stage]);
            self.fields.exchange_fields(self.topology)?;
        }
        self.t += self.dt;
        self.step += 1;
        Ok(())
    }

    /// Run `nt` steps, calling `observe` after each.
    pub fn solve<F>(&mut self, nt: usize, mut observe: F) -> SolverResult<()>
    where
        F: FnMut(&Self) -> SolverResult<()>,
    {
        for _ in 0..nt {
            self.step()?;
            observe(self)?;
        }
        log::info!("rank {}: {} steps, t = {:e}", self.topology.rank(), self.step, self.t);
        Ok(())
    }
}
