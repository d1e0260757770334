use crate::error::*;
use crate::fields::Fields;
use crate::util::*;

/// Map `v` in `[-scale, scale]` onto `[0, 1]`.
fn normalize(v: f64, scale: f64) -> f64 {
    if scale > 0.0 {
        (0.5 + 0.5 * v / scale).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// PNG of one state component over `aabb`, a window of a 2D problem.
///
/// The colour scale is symmetric about zero and fitted to the largest
/// magnitude in the window. `y` grows upwards.
pub fn image2d<F: AsRef<std::path::Path>>(
    fields: &Fields,
    aabb: &AABB<3>,
    comp: usize,
    s: &F,
) -> SolverResult<()> {
    if comp >= fields.nvar() {
        return Err(SolverError::Output(format!(
            "component {} out of range, state has {}",
            comp,
            fields.nvar()
        )));
    }
    log::info!("Writing png: {:?}", s.as_ref());
    let npts = fields.npts();
    let value = |c: &Coord3| fields.f[comp * npts + fields.point(c)];
    let scale = aabb.coord_iter().fold(0.0_f64, |m, c| m.max(value(&c).abs()));

    let min = aabb.min();
    let exclusive_bounds = aabb.exclusive_bounds();
    let (width, height) = (exclusive_bounds[0] as u32, exclusive_bounds[1] as u32);
    let gradient = colorous::TURBO;
    let mut img = image::RgbImage::new(width, height);
    for coord in aabb.coord_iter() {
        if coord[2] != min[2] {
            continue;
        }
        let c = gradient.eval_continuous(normalize(value(&coord), scale));
        img.put_pixel(
            (coord[0] - min[0]) as u32,
            height - 1 - (coord[1] - min[1]) as u32,
            image::Rgb(c.as_array()),
        );
    }
    img.save(s)?;
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn normalize_test() {
        assert_eq!(normalize(0.0, 2.0), 0.5);
        assert_eq!(normalize(-2.0, 2.0), 0.0);
        assert_eq!(normalize(2.0, 2.0), 1.0);
        assert_eq!(normalize(5.0, 0.0), 0.5);
    }
}
