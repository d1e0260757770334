//! Characteristic boundary conditions imposed weakly through SAT penalties.

use crate::derivative::ElasticKernel;
use crate::fields::*;
use crate::material::Material;
use crate::partition::BlockCoord;
use crate::rotation::*;
use crate::stencil::SbpOperator;
use crate::surface::LocalSurface;
use crate::util::*;
use serde::{Deserialize, Serialize};

/// Physical condition on an outer block face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// Non-reflecting.
    #[default]
    Absorbing,
    /// Traction free.
    Free,
    /// Zero velocity.
    Rigid,
    /// Face handled elsewhere, typically by an interface.
    None,
}

impl BoundaryKind {
    /// Reflection coefficient of the outgoing characteristic.
    pub fn reflection(&self) -> Option<f64> {
        match self {
            BoundaryKind::Absorbing => Some(0.0),
            BoundaryKind::Free => Some(-1.0),
            BoundaryKind::Rigid => Some(1.0),
            BoundaryKind::None => None,
        }
    }
}

/// Penalty weight of a face point, `J |∇ξ_d| / (h0 dξ_d)`.
pub(crate) fn penalty_weight(state: &StateView<'_>, d: usize, p: usize, h0: f64, dx: f64) -> f64 {
    let norm = (0..state.ndim)
        .map(|k| state.metric(d, k, p).powi(2))
        .sum::<f64>()
        .sqrt();
    state.jac[p] * norm / (h0 * dx)
}

/// Wave speeds entering the penalty, P for the normal pair and S for the
/// tangential ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Speeds {
    pub cp: f64,
    pub cs: f64,
    pub zp: f64,
    pub zs: f64,
}

impl Speeds {
    pub fn new(material: &Material) -> Self {
        Speeds {
            cp: material.cp(),
            cs: material.cs(),
            zp: material.zp(),
            zs: material.zs(),
        }
    }

    /// Impedance of frame component `k`.
    pub fn z(&self, k: usize) -> f64 {
        if k == 0 {
            self.zp
        } else {
            self.zs
        }
    }
}

/// `df -= dt h (cp P + cs S)` where `P, S` are the normal and tangential
/// parts of `rotated - targets`, taken back to Cartesian components.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_penalty(
    kernel: ElasticKernel,
    df: &mut [f64],
    npts: usize,
    p: usize,
    dt: f64,
    h: f64,
    speeds: &Speeds,
    frame: &Frame,
    rotated: &BoundFields,
    targets: &[Characteristic; 3],
) {
    let (p_part, s_part) = split_mismatch(rotated, targets);
    kernel.accumulate(df, npts, p, -dt * speeds.cp * h, &rotate_nt_xy(&p_part, frame));
    kernel.accumulate(df, npts, p, -dt * speeds.cs * h, &rotate_nt_xy(&s_part, frame));
}

/// One face of one block, restricted to the points this process owns.
#[derive(Debug, Clone)]
pub struct Boundary {
    location: usize,
    kind: BoundaryKind,
    kernel: ElasticKernel,
    face: Option<AABB<3>>,
    frames: Vec<Frame>,
    h: Vec<f64>,
    speeds: Speeds,
}

impl Boundary {
    /// Needs the block grid in `fields` to be set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        location: usize,
        kind: BoundaryKind,
        kernel: ElasticKernel,
        coord: &BlockCoord,
        dx: &[f64; 3],
        surface: &LocalSurface,
        fields: &Fields,
        material: &Material,
        sbp: &SbpOperator,
    ) -> Self {
        let d = location / 2;
        let face = match kind {
            BoundaryKind::None => None,
            _ => coord.face(location),
        };

        let mut frames = Vec::new();
        let mut h = Vec::new();
        if let Some(face) = &face {
            let view = fields.view();
            frames.reserve(face.buffer_size());
            h.reserve(face.buffer_size());
            // face coordinates iterate in the same order as the local normals
            for (c, n) in face.coord_iter().zip(surface.normals()) {
                frames.push(Frame::from_normal(n));
                h.push(penalty_weight(&view, d, view.point(&c), sbp.h0(), dx[d]));
            }
        }

        Boundary {
            location,
            kind,
            kernel,
            face,
            frames,
            h,
            speeds: Speeds::new(material),
        }
    }

    pub fn location(&self) -> usize {
        self.location
    }

    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    /// Whether this process holds any point of the face.
    pub fn is_local(&self) -> bool {
        self.face.is_some()
    }

    /// Add the boundary penalty to `fields.df`.
    pub fn apply_bcs(&self, dt: f64, fields: &mut Fields) {
        let (Some(face), Some(r)) = (&self.face, self.kind.reflection()) else {
            return;
        };
        profiling::scope!("boundary");
        let npts = fields.npts();
        let (state, df) = fields.split_df();
        for ((c, frame), h) in face.coord_iter().zip(&self.frames).zip(&self.h) {
            let p = state.point(&c);
            let b = self.kernel.load(state.f, npts, p);
            let rotated = rotate_xy_nt(&b, frame);
            let targets = std::array::from_fn(|k| {
                reflect(&Characteristic::component(&rotated, k), self.speeds.z(k), r)
            });
            apply_penalty(self.kernel, df, npts, p, dt, *h, &self.speeds, frame, &rotated, &targets);
        }
    }
}
