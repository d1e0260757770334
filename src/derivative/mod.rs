//! Curvilinear elastic right-hand side.
//!
//! For each differenced direction `d` and owned point `i`, with SBP row
//! weights `(j, w)`:
//!
//! ```text
//! T_a  = sum_j w J(j) m_d(j) . sigma_a(j)        v_a     += dt / (rho J(i) dξ_d) T_a
//! dv_b = sum_j w v_b(j)                          sigma_ab += dt / dξ_d (lambda delta_ab m_d(i).dv
//!                                                                   + mu (m_da(i) dv_b + m_db(i) dv_a))
//! ```
//!
//! Each kernel only differs in which components are populated.

mod mode2;
mod mode3;
mod three_d;

use crate::error::*;
use crate::fields::*;
use crate::grid::JACOBIAN_EPSILON;
use crate::material::Material;
use crate::rotation::BoundFields;
use crate::stencil::*;
use crate::util::*;

/// Component layout of the 2D in-plane state.
pub mod mode2_layout {
    pub const V1: usize = 0;
    pub const V2: usize = 1;
    pub const S11: usize = 2;
    pub const S12: usize = 3;
    pub const S22: usize = 4;
}

/// Component layout of the 2D anti-plane state.
pub mod mode3_layout {
    pub const V3: usize = 0;
    pub const S13: usize = 1;
    pub const S23: usize = 2;
}

/// Component layout of the 3D state.
pub mod three_d_layout {
    pub const V1: usize = 0;
    pub const V2: usize = 1;
    pub const V3: usize = 2;
    pub const S11: usize = 3;
    pub const S12: usize = 4;
    pub const S13: usize = 5;
    pub const S22: usize = 6;
    pub const S23: usize = 7;
    pub const S33: usize = 8;
}

/// Which elastic system a block solves, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElasticKernel {
    /// 2D in-plane: v1, v2, s11, s12, s22.
    ModeII,
    /// 2D anti-plane: v3, s13, s23.
    ModeIII,
    ThreeD,
}

impl ElasticKernel {
    pub fn new(ndim: usize, mode: usize) -> SolverResult<Self> {
        match (ndim, mode) {
            (2, 2) => Ok(ElasticKernel::ModeII),
            (2, 3) => Ok(ElasticKernel::ModeIII),
            (3, 2) | (3, 3) => Ok(ElasticKernel::ThreeD),
            _ => Err(SolverError::InvalidMode { ndim, mode }),
        }
    }

    pub fn ndim(&self) -> usize {
        match self {
            ElasticKernel::ThreeD => 3,
            _ => 2,
        }
    }

    pub fn nvar(&self) -> usize {
        match self {
            ElasticKernel::ModeII => 5,
            ElasticKernel::ModeIII => 3,
            ElasticKernel::ThreeD => 9,
        }
    }

    /// Component names in storage order.
    pub fn component_names(&self) -> &'static [&'static str] {
        match self {
            ElasticKernel::ModeII => &["v1", "v2", "s11", "s12", "s22"],
            ElasticKernel::ModeIII => &["v3", "s13", "s23"],
            ElasticKernel::ThreeD => &["v1", "v2", "v3", "s11", "s12", "s13", "s22", "s23", "s33"],
        }
    }

    /// Indices of the normal stress components, which the reference pulse
    /// perturbs.
    pub fn normal_stresses(&self) -> &'static [usize] {
        match self {
            ElasticKernel::ModeII => &[mode2_layout::S11, mode2_layout::S22],
            ElasticKernel::ModeIII => &[],
            ElasticKernel::ThreeD => &[
                three_d_layout::S11,
                three_d_layout::S22,
                three_d_layout::S33,
            ],
        }
    }

    pub fn velocities(&self) -> &'static [usize] {
        match self {
            ElasticKernel::ModeII => &[mode2_layout::V1, mode2_layout::V2],
            ElasticKernel::ModeIII => &[mode3_layout::V3],
            ElasticKernel::ThreeD => &[
                three_d_layout::V1,
                three_d_layout::V2,
                three_d_layout::V3,
            ],
        }
    }

    /// The state at flat point `p` as a full velocity and stress tensor,
    /// unpopulated components zero.
    pub fn load(&self, f: &[f64], npts: usize, p: usize) -> BoundFields {
        let at = |comp: usize| f[comp * npts + p];
        let mut b = BoundFields::default();
        match self {
            ElasticKernel::ModeII => {
                use mode2_layout::*;
                b.v[0] = at(V1);
                b.v[1] = at(V2);
                b.set_stress(0, 0, at(S11));
                b.set_stress(0, 1, at(S12));
                b.set_stress(1, 1, at(S22));
            }
            ElasticKernel::ModeIII => {
                use mode3_layout::*;
                b.v[2] = at(V3);
                b.set_stress(0, 2, at(S13));
                b.set_stress(1, 2, at(S23));
            }
            ElasticKernel::ThreeD => {
                use three_d_layout::*;
                b.v[0] = at(V1);
                b.v[1] = at(V2);
                b.v[2] = at(V3);
                b.set_stress(0, 0, at(S11));
                b.set_stress(0, 1, at(S12));
                b.set_stress(0, 2, at(S13));
                b.set_stress(1, 1, at(S22));
                b.set_stress(1, 2, at(S23));
                b.set_stress(2, 2, at(S33));
            }
        }
        b
    }

    /// `df += scale * b` over the populated components at flat point `p`.
    pub fn accumulate(&self, df: &mut [f64], npts: usize, p: usize, scale: f64, b: &BoundFields) {
        let mut add = |comp: usize, value: f64| df[comp * npts + p] += scale * value;
        match self {
            ElasticKernel::ModeII => {
                use mode2_layout::*;
                add(V1, b.v[0]);
                add(V2, b.v[1]);
                add(S11, b.s[(0, 0)]);
                add(S12, b.s[(0, 1)]);
                add(S22, b.s[(1, 1)]);
            }
            ElasticKernel::ModeIII => {
                use mode3_layout::*;
                add(V3, b.v[2]);
                add(S13, b.s[(0, 2)]);
                add(S23, b.s[(1, 2)]);
            }
            ElasticKernel::ThreeD => {
                use three_d_layout::*;
                add(V1, b.v[0]);
                add(V2, b.v[1]);
                add(V3, b.v[2]);
                add(S11, b.s[(0, 0)]);
                add(S12, b.s[(0, 1)]);
                add(S13, b.s[(0, 2)]);
                add(S22, b.s[(1, 1)]);
                add(S23, b.s[(1, 2)]);
                add(S33, b.s[(2, 2)]);
            }
        }
    }
}

/// Inputs shared by every row of one direction's pass.
pub(crate) struct RowContext<'a> {
    pub state: StateView<'a>,
    pub d: usize,
    pub dt: f64,
    pub dx: f64,
    pub rho: f64,
    pub lambda: f64,
    pub g: f64,
}

impl RowContext<'_> {
    /// Velocity rows are skipped on points with a degenerate mapping.
    #[inline]
    pub fn velocity_scale(&self, p: usize) -> Option<f64> {
        let jac = self.state.jac[p];
        if jac > JACOBIAN_EPSILON {
            Some(self.dt / (self.rho * jac * self.dx))
        } else {
            None
        }
    }

    #[inline]
    pub fn stress_scale(&self) -> f64 {
        self.dt / self.dx
    }

    /// `J(p) dξ_d/dx_k` at flat point `p`.
    #[inline]
    pub fn jm(&self, k: usize, p: usize) -> f64 {
        self.state.jac[p] * self.state.metric(self.d, k, p)
    }
}

/// Visit every owned point with its difference row along `d`.
///
/// Rows yield neighbor coordinates, ready to be turned into flat points.
pub(crate) fn traverse<F>(regions: &[StencilRegions; 3], sbp: &SbpOperator, d: usize, mut visit: F)
where
    F: FnMut(Coord3, &mut dyn Iterator<Item = (Coord3, f64)>),
{
    for i in regions[0].owned() {
        for j in regions[1].owned() {
            for k in regions[2].owned() {
                let c = vector![i, j, k];
                let mut row = regions[d].row(sbp, c[d]).map(|(n, w)| {
                    let mut cn = c;
                    cn[d] = n;
                    (cn, w)
                });
                visit(c, &mut row);
            }
        }
    }
}

/// Accumulate `dt` times the elastic right-hand side of a block into
/// `fields.df`, one direction at a time.
pub fn calc_df(
    kernel: ElasticKernel,
    regions: &[StencilRegions; 3],
    dx: &[f64; 3],
    material: &Material,
    sbp: &SbpOperator,
    dt: f64,
    fields: &mut Fields,
) {
    profiling::scope!("calc_df");
    let (state, df) = fields.split_df();
    for d in 0..kernel.ndim() {
        let ctx = RowContext {
            state,
            d,
            dt,
            dx: dx[d],
            rho: material.rho,
            lambda: material.lambda,
            g: material.g,
        };
        match kernel {
            ElasticKernel::ModeII => mode2::rows(&ctx, regions, sbp, df),
            ElasticKernel::ModeIII => mode3::rows(&ctx, regions, sbp, df),
            ElasticKernel::ThreeD => three_d::rows(&ctx, regions, sbp, df),
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn kernel_selection() {
        assert_eq!(ElasticKernel::new(2, 2).unwrap(), ElasticKernel::ModeII);
        assert_eq!(ElasticKernel::new(2, 3).unwrap().nvar(), 3);
        assert_eq!(ElasticKernel::new(3, 2).unwrap().nvar(), 9);
        assert!(matches!(
            ElasticKernel::new(1, 2),
            Err(SolverError::InvalidMode { ndim: 1, mode: 2 })
        ));
        assert!(ElasticKernel::new(2, 4).is_err());
    }

    #[test]
    fn load_accumulate_layout() {
        for kernel in [ElasticKernel::ModeII, ElasticKernel::ModeIII, ElasticKernel::ThreeD] {
            let npts = 3;
            let nvar = kernel.nvar();
            let f: Vec<f64> = (0..nvar * npts).map(|i| i as f64 + 1.0).collect();
            let b = kernel.load(&f, npts, 1);
            assert_eq!(b.s, b.s.transpose());
            let mut df = vec![0.0; nvar * npts];
            kernel.accumulate(&mut df, npts, 1, 2.0, &b);
            for comp in 0..nvar {
                assert_eq!(df[comp * npts + 1], 2.0 * f[comp * npts + 1]);
                assert_eq!(df[comp * npts], 0.0);
            }
        }
    }
}
