use crate::error::*;
use crate::par_slice;
use crate::topology::*;
use crate::util::*;

/// Field storage for one process.
///
/// Every buffer covers the process window plus its ghost layers
/// ([`ProcessWindow::buffer`]) and is addressed by global grid index.
/// Multi-component buffers are component-major.
#[derive(Debug, Clone)]
pub struct Fields {
    ndim: usize,
    nvar: usize,
    aabb: AABB<3>,
    npts: usize,
    chunk_size: usize,
    /// Physical coordinates, always three components.
    pub x: Vec<f64>,
    /// `ndim * ndim` components, `metric[l * ndim + m]` is `dξ_l/dx_m`.
    pub metric: Vec<f64>,
    pub jac: Vec<f64>,
    pub f: Vec<f64>,
    pub df: Vec<f64>,
}

/// Read-only state handed to kernels while `df` is borrowed mutably.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub ndim: usize,
    pub aabb: &'a AABB<3>,
    pub npts: usize,
    pub f: &'a [f64],
    pub jac: &'a [f64],
    pub metric: &'a [f64],
}

impl StateView<'_> {
    #[inline]
    pub fn point(&self, coord: &Coord3) -> usize {
        self.aabb.coord_to_linear(coord)
    }

    #[inline]
    pub fn f(&self, comp: usize, p: usize) -> f64 {
        self.f[comp * self.npts + p]
    }

    /// `dξ_l/dx_m` at point `p`.
    #[inline]
    pub fn metric(&self, l: usize, m: usize, p: usize) -> f64 {
        self.metric[(l * self.ndim + m) * self.npts + p]
    }
}

impl Fields {
    pub fn new(ndim: usize, nvar: usize, window: &ProcessWindow) -> Self {
        let aabb = window.buffer();
        let npts = aabb.buffer_size();
        log::debug!("fields: {} variables over {}", nvar, aabb);
        Fields {
            ndim,
            nvar,
            aabb,
            npts,
            chunk_size: 4096,
            x: vec![0.0; NDIM_MAX * npts],
            metric: vec![0.0; ndim * ndim * npts],
            jac: vec![0.0; npts],
            f: vec![0.0; nvar * npts],
            df: vec![0.0; nvar * npts],
        }
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn nvar(&self) -> usize {
        self.nvar
    }

    pub fn aabb(&self) -> &AABB<3> {
        &self.aabb
    }

    pub fn npts(&self) -> usize {
        self.npts
    }

    #[inline]
    pub fn point(&self, coord: &Coord3) -> usize {
        self.aabb.coord_to_linear(coord)
    }

    /// Flat offset of component `comp` at `coord`.
    #[inline]
    pub fn offset(&self, comp: usize, coord: &Coord3) -> usize {
        comp * self.npts + self.point(coord)
    }

    #[inline]
    pub fn metric_offset(&self, l: usize, m: usize, coord: &Coord3) -> usize {
        (l * self.ndim + m) * self.npts + self.point(coord)
    }

    pub fn coords(&self, coord: &Coord3) -> Vector3<f64> {
        let p = self.point(coord);
        Vector3::new(
            self.x[p],
            self.x[self.npts + p],
            self.x[2 * self.npts + p],
        )
    }

    pub fn split_df(&mut self) -> (StateView<'_>, &mut [f64]) {
        (
            StateView {
                ndim: self.ndim,
                aabb: &self.aabb,
                npts: self.npts,
                f: &self.f,
                jac: &self.jac,
                metric: &self.metric,
            },
            &mut self.df,
        )
    }

    pub fn view(&self) -> StateView<'_> {
        StateView {
            ndim: self.ndim,
            aabb: &self.aabb,
            npts: self.npts,
            f: &self.f,
            jac: &self.jac,
            metric: &self.metric,
        }
    }

    /// Ghost refresh of coordinates, metric and Jacobian.
    pub fn exchange_grid<T: Topology>(&mut self, topology: &T) -> SolverResult<()> {
        topology.exchange(&mut self.x, NDIM_MAX)?;
        topology.exchange(&mut self.metric, self.ndim * self.ndim)?;
        topology.exchange(&mut self.jac, 1)
    }

    /// Ghost refresh of the state.
    pub fn exchange_fields<T: Topology>(&mut self, topology: &T) -> SolverResult<()> {
        topology.exchange(&mut self.f, self.nvar)
    }

    /// First half of a low-storage stage, `df = a * df`.
    pub fn scale_df(&mut self, a: f64) {
        profiling::scope!("scale_df");
        if a == 0.0 {
            par_slice::set_value(&mut self.df, 0.0, self.chunk_size);
        } else {
            par_slice::scale_by(&mut self.df, a, self.chunk_size);
        }
    }

    /// Second half of a low-storage stage, `f += b * df`.
    pub fn update(&mut self, b: f64) {
        profiling::scope!("update");
        par_slice::add_scaled(&mut self.f, &self.df, b, self.chunk_size);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn offsets_test() {
        let window = ProcessWindow {
            nx: vector![20, 8, 1],
            xm_loc: vector![10, 0, 0],
            nx_loc: vector![10, 8, 1],
            xm_ghost: vector![1, 0, 0],
            xp_ghost: vector![0, 0, 0],
        };
        let fields = Fields::new(2, 5, &window);
        assert_eq!(fields.npts(), 11 * 8);
        assert_eq!(fields.f.len(), 5 * 11 * 8);
        assert_eq!(fields.metric.len(), 4 * 11 * 8);
        assert_eq!(fields.offset(0, &vector![9, 0, 0]), 0);
        assert_eq!(fields.offset(1, &vector![10, 1, 0]), 88 + 8 + 1);
        assert_eq!(fields.metric_offset(1, 0, &vector![9, 0, 0]), 2 * 88);
    }

    #[test]
    fn low_storage_update_test() {
        let window = ProcessWindow::whole(vector![4, 4, 1]);
        let mut fields = Fields::new(2, 3, &window);
        fields.df.iter_mut().for_each(|v| *v = 2.0);
        fields.scale_df(0.5);
        fields.update(3.0);
        assert!(fields.f.iter().all(|v| *v == 3.0));
        fields.df[0] = f64::NAN;
        fields.scale_df(0.0);
        assert!(fields.df.iter().all(|v| *v == 0.0));
    }
}
