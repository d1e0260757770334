//! Coupling of two blocks that meet across a shared face.
//!
//! `block_b` lies on the plus side of `block_a` along `direction`. The two
//! sides own distinct grid points one step apart, side 1 on the last layer
//! of `block_a` and side 2 on the first layer of `block_b`. Each side is
//! penalized towards a common interface state only where this process owns
//! it, the other side is read from ghosts.

use crate::boundary::{apply_penalty, penalty_weight, Speeds};
use crate::derivative::ElasticKernel;
use crate::error::*;
use crate::fields::*;
use crate::material::Material;
use crate::partition::BlockCoord;
use crate::rotation::*;
use crate::stencil::SbpOperator;
use crate::surface::*;
use crate::util::*;
use serde::{Deserialize, Serialize};

/// Contact law across an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// Continuous velocity and traction.
    #[default]
    Locked,
    /// Welded in the normal direction, free to slip tangentially.
    Frictionless,
}

/// What the interface needs from each of its blocks.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceSide<'a> {
    pub block: usize,
    pub coord: &'a BlockCoord,
    pub dx: &'a [f64; 3],
    pub material: &'a Material,
}

#[derive(Debug, Clone)]
pub struct Interface {
    block_a: usize,
    block_b: usize,
    direction: usize,
    kind: InterfaceKind,
    kernel: ElasticKernel,
    is_local: [bool; 2],
    /// Side 1 points, side 2 sits one step further along `direction`.
    points: Option<AABB<3>>,
    delta: Coord3,
    frames: Vec<Frame>,
    h1: Vec<f64>,
    h2: Vec<f64>,
    speeds: [Speeds; 2],
}

impl Interface {
    /// `surface` is the plus face of `block_a` along `direction`. Needs the
    /// grid of both blocks, ghosts included, in `fields`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        direction: usize,
        kind: InterfaceKind,
        kernel: ElasticKernel,
        a: &InterfaceSide<'_>,
        b: &InterfaceSide<'_>,
        surface: &dyn Surface,
        fields: &Fields,
        sbp: &SbpOperator,
    ) -> SolverResult<Self> {
        let d = direction;
        let mismatch = |what: &'static str, left: i32, right: i32| SolverError::InterfaceMismatch {
            block_a: a.block,
            block_b: b.block,
            direction,
            what,
            left,
            right,
        };

        if b.coord.xm[d] != a.coord.xp(d) + 1 {
            return Err(mismatch("blocks not adjacent", a.coord.xp(d) + 1, b.coord.xm[d]));
        }
        for t in face_dims(d) {
            if a.coord.nx[t] != b.coord.nx[t] {
                return Err(mismatch("transverse point count", a.coord.nx[t], b.coord.nx[t]));
            }
            if a.coord.xm[t] != b.coord.xm[t] {
                return Err(mismatch("transverse offset", a.coord.xm[t], b.coord.xm[t]));
            }
        }

        let side1 = a.coord.face(2 * d + 1);
        let side2 = b.coord.face(2 * d);
        if let (Some(_), Some(_)) = (&side1, &side2) {
            for t in face_dims(d) {
                if a.coord.nx_loc[t] != b.coord.nx_loc[t] {
                    return Err(mismatch("transverse owned count", a.coord.nx_loc[t], b.coord.nx_loc[t]));
                }
            }
        }

        let mut delta = Coord3::zero();
        delta[d] = 1;
        let is_local = [side1.is_some(), side2.is_some()];
        let (points, window) = match (side1, side2) {
            (Some(face), _) => (Some(face), a.coord.face_window(d)),
            (None, Some(face)) => {
                let edge = face.min()[d] - 1;
                (Some(face.slab(d, edge, edge)), b.coord.face_window(d))
            }
            (None, None) => (None, ([0, 0], [0, 0])),
        };

        let mut frames = Vec::new();
        let mut h1 = Vec::new();
        let mut h2 = Vec::new();
        if let Some(points) = &points {
            let (offset, n_loc) = window;
            let local = LocalSurface::new(surface, offset, n_loc);
            let view = fields.view();
            for (c, n) in points.coord_iter().zip(local.normals()) {
                frames.push(Frame::from_normal(n));
                h1.push(penalty_weight(&view, d, view.point(&c), sbp.h0(), a.dx[d]));
                h2.push(penalty_weight(&view, d, view.point(&(c + delta)), sbp.h0(), b.dx[d]));
            }
        }

        log::debug!(
            "interface {} -> {} along {}: sides local {:?}",
            a.block,
            b.block,
            direction,
            is_local
        );

        Ok(Interface {
            block_a: a.block,
            block_b: b.block,
            direction,
            kind,
            kernel,
            is_local,
            points,
            delta,
            frames,
            h1,
            h2,
            speeds: [Speeds::new(a.material), Speeds::new(b.material)],
        })
    }

    pub fn blocks(&self) -> (usize, usize) {
        (self.block_a, self.block_b)
    }

    pub fn direction(&self) -> usize {
        self.direction
    }

    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Whether this process owns side 1 and side 2.
    pub fn is_local(&self) -> [bool; 2] {
        self.is_local
    }

    /// Interface state in each side's own frame, `None` when the impedances
    /// cannot be combined.
    fn targets(
        &self,
        r1: &BoundFields,
        r2: &BoundFields,
    ) -> Option<([Characteristic; 3], [Characteristic; 3])> {
        let mut t1 = [Characteristic::default(); 3];
        let mut t2 = [Characteristic::default(); 3];
        for k in 0..3 {
            let c1 = Characteristic::component(r1, k);
            let c2 = Characteristic::component(r2, k);
            let (z1, z2) = (self.speeds[0].z(k), self.speeds[1].z(k));
            if k > 0 && self.kind == InterfaceKind::Frictionless {
                t1[k] = free_slip(&c1, z1);
                t2[k] = free_slip(&c2, z2);
            } else {
                let hat = locked(&c1, &c2, z1, z2)?;
                t1[k] = hat;
                t2[k] = Characteristic { v: -hat.v, s: hat.s };
            }
        }
        Some((t1, t2))
    }

    /// Add the interface penalties of the locally owned sides to `fields.df`.
    pub fn apply_bcs(&self, dt: f64, fields: &mut Fields) {
        let Some(points) = &self.points else {
            return;
        };
        profiling::scope!("interface");
        let npts = fields.npts();
        let (state, df) = fields.split_df();
        for (i, c) in points.coord_iter().enumerate() {
            let p1 = state.point(&c);
            let p2 = state.point(&(c + self.delta));
            let frame1 = self.frames[i];
            let frame2 = frame1.flipped();
            let r1 = rotate_xy_nt(&self.kernel.load(state.f, npts, p1), &frame1);
            let r2 = rotate_xy_nt(&self.kernel.load(state.f, npts, p2), &frame2);

            let Some((t1, t2)) = self.targets(&r1, &r2) else {
                log::warn!(
                    "interface {} -> {}: vanishing impedance at {:?}, skipped",
                    self.block_a,
                    self.block_b,
                    c.as_slice()
                );
                continue;
            };
            if self.is_local[0] {
                apply_penalty(self.kernel, df, npts, p1, dt, self.h1[i], &self.speeds[0], &frame1, &r1, &t1);
            }
            if self.is_local[1] {
                apply_penalty(self.kernel, df, npts, p2, dt, self.h2[i], &self.speeds[1], &frame2, &r2, &t2);
            }
        }
    }
}
