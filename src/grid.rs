//! Grid coordinates, metric and Jacobian of one block.

use crate::error::*;
use crate::fields::*;
use crate::partition::*;
use crate::stencil::*;
use crate::surface::*;
use crate::topology::*;
use crate::util::*;

/// Jacobians at or below this are treated as a folded grid.
pub const JACOBIAN_EPSILON: f64 = 1e-12;

/// `dx_l/dξ_m` for every owned point, flat `(3, 3, n_loc)`.
///
/// Undifferenced directions keep the identity, which reduces the 3x3
/// determinant and cofactors to their 2D counterparts.
struct CoordinateDerivatives {
    aabb: AABB<3>,
    npts: usize,
    data: Vec<f64>,
}

impl CoordinateDerivatives {
    fn identity(aabb: AABB<3>) -> Self {
        let npts = aabb.buffer_size();
        let mut data = vec![0.0; 9 * npts];
        for l in 0..3 {
            let start = (l * 3 + l) * npts;
            data[start..start + npts].iter_mut().for_each(|v| *v = 1.0);
        }
        CoordinateDerivatives { aabb, npts, data }
    }

    #[inline]
    fn index(&self, l: usize, m: usize, coord: &Coord3) -> usize {
        (l * 3 + m) * self.npts + self.aabb.coord_to_linear(coord)
    }

    fn matrix(&self, coord: &Coord3) -> Matrix3<f64> {
        Matrix3::from_fn(|l, m| self.data[self.index(l, m, coord)])
    }
}

/// Transfinite interpolation of the block faces at global point `c`.
///
/// `jj, kk, ll` are block-relative indices and `p, q, r` the reference
/// coordinates. 2D problems drop every term involving the z faces.
fn transfinite(
    ndim: usize,
    coord: &BlockCoord,
    dx: &[f64; 3],
    surfaces: &[Box<dyn Surface>],
    c: &Coord3,
) -> Vector3<f64> {
    let rel = c - coord.xm;
    let (jj, kk, ll) = (rel[0] as usize, rel[1] as usize, rel[2] as usize);
    let p = jj as f64 * dx[0];
    let q = kk as f64 * dx[1];
    let ny = coord.nx[1] as usize;
    let s = |location: usize, i: usize, j: usize| surfaces[location].x(i, j);

    let mut x = (1.0 - p) * s(0, kk, ll)
        + p * s(1, kk, ll)
        + (1.0 - q) * s(2, jj, ll)
        + q * s(3, jj, ll);

    x -= (1.0 - q) * (1.0 - p) * s(0, 0, ll)
        + (1.0 - q) * p * s(1, 0, ll)
        + q * (1.0 - p) * s(0, ny - 1, ll)
        + q * p * s(1, ny - 1, ll);

    if ndim == 3 {
        let r = ll as f64 * dx[2];
        let nz = coord.nx[2] as usize;
        x += (1.0 - r) * s(4, jj, kk) + r * s(5, jj, kk);

        x -= (1.0 - p) * (1.0 - r) * s(0, kk, 0)
            + p * (1.0 - r) * s(1, kk, 0)
            + (1.0 - q) * (1.0 - r) * s(2, jj, 0)
            + q * (1.0 - r) * s(3, jj, 0)
            + (1.0 - p) * r * s(0, kk, nz - 1)
            + p * r * s(1, kk, nz - 1)
            + (1.0 - q) * r * s(2, jj, nz - 1)
            + q * r * s(3, jj, nz - 1);

        x += (1.0 - p) * (1.0 - q) * (1.0 - r) * s(0, 0, 0)
            + p * (1.0 - q) * (1.0 - r) * s(1, 0, 0)
            + (1.0 - p) * q * (1.0 - r) * s(0, ny - 1, 0)
            + (1.0 - p) * (1.0 - q) * r * s(0, 0, nz - 1)
            + p * q * (1.0 - r) * s(1, ny - 1, 0)
            + p * (1.0 - q) * r * s(1, 0, nz - 1)
            + (1.0 - p) * q * r * s(0, ny - 1, nz - 1)
            + p * q * r * s(1, ny - 1, nz - 1);
    }
    x
}

/// Everything [`set_grid`] needs to know about the block.
pub struct GridInput<'a> {
    pub block: usize,
    pub ndim: usize,
    pub coord: &'a BlockCoord,
    pub regions: &'a [StencilRegions; 3],
    pub dx: &'a [f64; 3],
    pub surfaces: &'a [Box<dyn Surface>],
    pub sbp: &'a SbpOperator,
}

/// Fill coordinates, metric and Jacobian for the owned points of a block,
/// then refresh ghosts.
///
/// The exchange is collective, so processes without data for this block
/// still take part. Points with a folded or singular mapping are returned
/// and keep a zero metric and Jacobian.
pub fn set_grid<T: Topology>(
    input: &GridInput<'_>,
    fields: &mut Fields,
    topology: &T,
) -> SolverResult<Vec<Degeneracy>> {
    profiling::scope!("set_grid");
    let degeneracies = match input.coord.owned_with_ghosts() {
        Some(ghosted) => {
            set_coordinates(input, &ghosted, fields);
            set_metric(input, fields)
        }
        None => Vec::new(),
    };
    for d in &degeneracies {
        log::warn!("degenerate grid: {}", d);
    }
    fields.exchange_grid(topology)?;
    Ok(degeneracies)
}

fn set_coordinates(input: &GridInput<'_>, ghosted: &AABB<3>, fields: &mut Fields) {
    let npts = fields.npts();
    for c in ghosted.coord_iter() {
        let x = transfinite(input.ndim, input.coord, input.dx, input.surfaces, &c);
        let p = fields.point(&c);
        for l in 0..NDIM_MAX {
            fields.x[l * npts + p] = x[l];
        }
    }
}

fn coordinate_derivatives(input: &GridInput<'_>, owned: AABB<3>, fields: &Fields) -> CoordinateDerivatives {
    let mut xp = CoordinateDerivatives::identity(owned);
    let npts = fields.npts();
    for m in 0..input.ndim {
        for c in owned.coord_iter() {
            for l in 0..input.ndim {
                let mut sum = 0.0;
                for (j, w) in input.regions[m].row(input.sbp, c[m]) {
                    let mut cj = c;
                    cj[m] = j;
                    sum += w * fields.x[l * npts + fields.point(&cj)];
                }
                let index = xp.index(l, m, &c);
                xp.data[index] = sum / input.dx[m];
            }
        }
    }
    xp
}

fn set_metric(input: &GridInput<'_>, fields: &mut Fields) -> Vec<Degeneracy> {
    let mut degeneracies = Vec::new();
    let Some(owned) = input.coord.owned() else {
        return degeneracies;
    };
    let xp = coordinate_derivatives(input, owned, fields);
    let ndim = input.ndim;
    let npts = fields.npts();

    for c in owned.coord_iter() {
        let a = xp.matrix(&c);
        let jac = a.determinant();
        let p = fields.point(&c);
        if !(jac > JACOBIAN_EPSILON) {
            degeneracies.push(Degeneracy {
                block: input.block,
                coord: c,
                jacobian: jac,
            });
            fields.jac[p] = 0.0;
            for lm in 0..ndim * ndim {
                fields.metric[lm * npts + p] = 0.0;
            }
            continue;
        }
        fields.jac[p] = jac;
        for l in 0..ndim {
            for m in 0..ndim {
                let (m1, m2) = ((m + 1) % 3, (m + 2) % 3);
                let (l1, l2) = ((l + 1) % 3, (l + 2) % 3);
                let cofactor = a[(m1, l1)] * a[(m2, l2)] - a[(m1, l2)] * a[(m2, l1)];
                let offset = fields.metric_offset(l, m, &c);
                fields.metric[offset] = cofactor / jac;
            }
        }
    }
    degeneracies
}
