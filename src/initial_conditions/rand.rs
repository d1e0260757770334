use crate::fields::Fields;
use crate::util::*;
use rand::prelude::*;
use rayon::prelude::*;

/// Uniform noise on every component of the owned points.
pub fn rand_ic(owned: &AABB<3>, fields: &mut Fields, max_val: f64) {
    let points: Vec<usize> = owned.coord_iter().map(|c| fields.point(&c)).collect();
    let npts = fields.npts();
    for comp in 0..fields.nvar() {
        let values: Vec<f64> = points
            .par_iter()
            .map_init(rand::thread_rng, |rng, _| {
                if max_val > 0.0 {
                    rng.gen_range(-max_val..=max_val)
                } else {
                    0.0
                }
            })
            .collect();
        for (p, v) in points.iter().zip(values) {
            fields.f[comp * npts + p] = v;
        }
    }
}
