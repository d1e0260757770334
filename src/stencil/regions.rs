use crate::stencil::SbpOperator;
use std::ops::Range;

/// The three SBP regions of one dimension of a block's owned window,
/// in global indices.
///
/// The closure regions only exist where the owned window touches the block
/// edge. At a process cut the interior formula runs to the edge and reads
/// ghost points instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilRegions {
    /// First owned index.
    pub mlb: i32,
    /// First index using the interior row.
    pub mc: i32,
    /// One past the last index using the interior row.
    pub mrb: i32,
    /// One past the last owned index.
    pub prb: i32,
}

impl StencilRegions {
    /// `xm, nx` describe the whole block, `xm_loc, nx_loc` the owned window.
    pub fn new(
        xm: i32,
        nx: i32,
        xm_loc: i32,
        nx_loc: i32,
        closure_rows: i32,
    ) -> Self {
        let mlb = xm_loc;
        let prb = xm_loc + nx_loc;
        if nx_loc == 0 {
            return StencilRegions {
                mlb,
                mc: mlb,
                mrb: mlb,
                prb: mlb,
            };
        }

        let differenced = nx > 1;
        let xp = xm + nx - 1;
        let xp_loc = xm_loc + nx_loc - 1;
        let mc = if differenced && xm_loc == xm {
            mlb + closure_rows
        } else {
            mlb
        };
        let mrb = if differenced && xp_loc == xp {
            prb - closure_rows
        } else {
            prb
        };
        debug_assert!(mc <= mrb);

        StencilRegions { mlb, mc, mrb, prb }
    }

    pub fn owned(&self) -> Range<i32> {
        self.mlb..self.prb
    }

    pub fn left(&self) -> Range<i32> {
        self.mlb..self.mc
    }

    pub fn interior(&self) -> Range<i32> {
        self.mc..self.mrb
    }

    pub fn right(&self) -> Range<i32> {
        self.mrb..self.prb
    }

    /// The `(index, weight)` pairs of the difference row for point `i`.
    ///
    /// The right closure walks away from the block edge with negated weights,
    /// which is the left closure mirrored.
    pub fn row<'a>(&self, sbp: &'a SbpOperator, i: i32) -> StencilRow<'a> {
        debug_assert!(self.owned().contains(&i));
        if i < self.mc {
            StencilRow {
                coeffs: sbp.closure_row((i - self.mlb) as usize),
                anchor: self.mlb,
                step: 1,
                sign: 1.0,
                n: 0,
            }
        } else if i >= self.mrb {
            StencilRow {
                coeffs: sbp.closure_row((self.prb - 1 - i) as usize),
                anchor: self.prb - 1,
                step: -1,
                sign: -1.0,
                n: 0,
            }
        } else {
            StencilRow {
                coeffs: sbp.interior(),
                anchor: i - sbp.half_width(),
                step: 1,
                sign: 1.0,
                n: 0,
            }
        }
    }
}

/// Iterator over one difference row, see [`StencilRegions::row`].
#[derive(Debug, Clone)]
pub struct StencilRow<'a> {
    coeffs: &'a [f64],
    anchor: i32,
    step: i32,
    sign: f64,
    n: usize,
}

impl Iterator for StencilRow<'_> {
    type Item = (i32, f64);

    fn next(&mut self) -> Option<Self::Item> {
        // zero weights in the padded closure rows are still visited
        let w = *self.coeffs.get(self.n)?;
        let index = self.anchor + self.step * self.n as i32;
        self.n += 1;
        Some((index, self.sign * w))
    }
}
