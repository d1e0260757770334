use super::mode2_layout::*;
use super::*;

pub(super) fn rows(ctx: &RowContext<'_>, regions: &[StencilRegions; 3], sbp: &SbpOperator, df: &mut [f64]) {
    let state = &ctx.state;
    let npts = state.npts;
    let (lambda, g) = (ctx.lambda, ctx.g);

    traverse(regions, sbp, ctx.d, |c, row| {
        let mut t1 = 0.0;
        let mut t2 = 0.0;
        let mut dv1 = 0.0;
        let mut dv2 = 0.0;
        for (cj, w) in row {
            let pj = state.point(&cj);
            let (jm1, jm2) = (ctx.jm(0, pj), ctx.jm(1, pj));
            let (s11, s12, s22) = (state.f(S11, pj), state.f(S12, pj), state.f(S22, pj));
            t1 += w * (jm1 * s11 + jm2 * s12);
            t2 += w * (jm1 * s12 + jm2 * s22);
            dv1 += w * state.f(V1, pj);
            dv2 += w * state.f(V2, pj);
        }

        let p = state.point(&c);
        if let Some(scale) = ctx.velocity_scale(p) {
            df[V1 * npts + p] += scale * t1;
            df[V2 * npts + p] += scale * t2;
        }

        let (m1, m2) = (state.metric(ctx.d, 0, p), state.metric(ctx.d, 1, p));
        let scale = ctx.stress_scale();
        df[S11 * npts + p] += scale * ((lambda + 2.0 * g) * m1 * dv1 + lambda * m2 * dv2);
        df[S12 * npts + p] += scale * g * (m1 * dv2 + m2 * dv1);
        df[S22 * npts + p] += scale * ((lambda + 2.0 * g) * m2 * dv2 + lambda * m1 * dv1);
    });
}
