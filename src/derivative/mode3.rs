use super::mode3_layout::*;
use super::*;

pub(super) fn rows(ctx: &RowContext<'_>, regions: &[StencilRegions; 3], sbp: &SbpOperator, df: &mut [f64]) {
    let state = &ctx.state;
    let npts = state.npts;
    let g = ctx.g;

    traverse(regions, sbp, ctx.d, |c, row| {
        let mut t3 = 0.0;
        let mut dv3 = 0.0;
        for (cj, w) in row {
            let pj = state.point(&cj);
            t3 += w * (ctx.jm(0, pj) * state.f(S13, pj) + ctx.jm(1, pj) * state.f(S23, pj));
            dv3 += w * state.f(V3, pj);
        }

        let p = state.point(&c);
        if let Some(scale) = ctx.velocity_scale(p) {
            df[V3 * npts + p] += scale * t3;
        }

        // no normal stresses, lambda drops out
        let scale = ctx.stress_scale() * g;
        df[S13 * npts + p] += scale * state.metric(ctx.d, 0, p) * dv3;
        df[S23 * npts + p] += scale * state.metric(ctx.d, 1, p) * dv3;
    });
}
