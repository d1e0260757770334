use crate::derivative::ElasticKernel;
use crate::fields::Fields;
use crate::util::*;

/// Gaussian perturbation in physical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub center: Vector3<f64>,
    pub width: f64,
    pub amplitude: f64,
}

impl Pulse {
    /// Value at `x`, measured over the first `ndim` coordinates only.
    pub fn value(&self, ndim: usize, x: &Vector3<f64>) -> f64 {
        let r2: f64 = (0..ndim).map(|d| (x[d] - self.center[d]).powi(2)).sum();
        -self.amplitude * (-r2 / self.width).exp()
    }
}

/// Perturb the normal stresses of the owned points. Anti-plane problems have
/// none and get the pulse in their only velocity instead.
pub fn pulse_ic(pulse: &Pulse, kernel: ElasticKernel, owned: &AABB<3>, fields: &mut Fields) {
    let components = match kernel.normal_stresses() {
        [] => kernel.velocities(),
        normal => normal,
    };
    let npts = fields.npts();
    let ndim = kernel.ndim();
    for c in owned.coord_iter() {
        let p = fields.point(&c);
        let value = pulse.value(ndim, &fields.coords(&c));
        for comp in components {
            fields.f[comp * npts + p] = value;
        }
    }
}
