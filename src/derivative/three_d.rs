use super::three_d_layout::*;
use super::*;

const STRESS: [[usize; 3]; 3] = [[S11, S12, S13], [S12, S22, S23], [S13, S23, S33]];
const VELOCITY: [usize; 3] = [V1, V2, V3];

pub(super) fn rows(ctx: &RowContext<'_>, regions: &[StencilRegions; 3], sbp: &SbpOperator, df: &mut [f64]) {
    let state = &ctx.state;
    let npts = state.npts;
    let (lambda, g) = (ctx.lambda, ctx.g);

    traverse(regions, sbp, ctx.d, |c, row| {
        let mut t = [0.0; 3];
        let mut dv = [0.0; 3];
        for (cj, w) in row {
            let pj = state.point(&cj);
            let jm = [ctx.jm(0, pj), ctx.jm(1, pj), ctx.jm(2, pj)];
            for a in 0..3 {
                t[a] += w
                    * (jm[0] * state.f(STRESS[a][0], pj)
                        + jm[1] * state.f(STRESS[a][1], pj)
                        + jm[2] * state.f(STRESS[a][2], pj));
                dv[a] += w * state.f(VELOCITY[a], pj);
            }
        }

        let p = state.point(&c);
        if let Some(scale) = ctx.velocity_scale(p) {
            for a in 0..3 {
                df[VELOCITY[a] * npts + p] += scale * t[a];
            }
        }

        let m = [
            state.metric(ctx.d, 0, p),
            state.metric(ctx.d, 1, p),
            state.metric(ctx.d, 2, p),
        ];
        let divergence = m[0] * dv[0] + m[1] * dv[1] + m[2] * dv[2];
        let scale = ctx.stress_scale();
        for a in 0..3 {
            for b in a..3 {
                let mut rate = g * (m[a] * dv[b] + m[b] * dv[a]);
                if a == b {
                    rate += lambda * divergence;
                }
                df[STRESS[a][b] * npts + p] += scale * rate;
            }
        }
    });
}
