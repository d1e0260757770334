//! Distributed SBP-SAT finite difference solver for elastic waves in
//! multi-block curvilinear domains.

pub mod block;
pub mod boundary;
pub mod build_info;
pub mod cli;
pub mod config;
pub mod derivative;
pub mod error;
pub mod fields;
pub mod grid;
pub mod image;
pub mod initial_conditions;
pub mod interface;
pub mod material;
pub mod par_slice;
pub mod partition;
pub mod problem;
pub mod rotation;
pub mod stencil;
pub mod surface;
pub mod topology;
pub mod util;
pub mod vtk;
