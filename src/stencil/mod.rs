mod regions;
mod sbp;

pub mod standard_operators;

pub use regions::*;
pub use sbp::*;
