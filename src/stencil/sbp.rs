use crate::error::*;
use crate::stencil::standard_operators::*;

/// Summation-by-parts first derivative operator.
///
/// `order` is the SBP order `s`: the interior row spans `2s - 1` points,
/// there are `2(s - 1)` closure rows at each boundary and each closure row
/// spans `3(s - 1)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct SbpOperator {
    order: usize,
    interior: Vec<f64>,
    closure: Vec<Vec<f64>>,
    h0: f64,
}

impl SbpOperator {
    pub fn new(order: usize) -> SolverResult<Self> {
        let (interior, closure, h0) = match order {
            2 => (
                SBP2_INTERIOR.to_vec(),
                SBP2_CLOSURE.iter().map(|r| r.to_vec()).collect(),
                SBP2_H0,
            ),
            3 => (
                SBP4_INTERIOR.to_vec(),
                SBP4_CLOSURE.iter().map(|r| r.to_vec()).collect(),
                SBP4_H0,
            ),
            _ => return Err(SolverError::UnsupportedOrder(order)),
        };
        Ok(SbpOperator {
            order,
            interior,
            closure,
            h0,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Points read on either side of an interior point.
    pub fn half_width(&self) -> i32 {
        self.order as i32 - 1
    }

    /// Ghost layers needed at an interior process cut.
    pub fn ghost_width(&self) -> i32 {
        self.half_width()
    }

    pub fn closure_rows(&self) -> i32 {
        self.closure.len() as i32
    }

    pub fn closure_row(&self, distance: usize) -> &[f64] {
        &self.closure[distance]
    }

    pub fn interior(&self) -> &[f64] {
        &self.interior
    }

    /// Boundary entry of the SBP norm, scales the SAT penalties.
    pub fn h0(&self) -> f64 {
        self.h0
    }
}
