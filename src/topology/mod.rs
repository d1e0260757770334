//! The process topology seam.
//!
//! Every component is handed its [`ProcessWindow`] explicitly; nothing asks
//! for a rank in the middle of an algorithm.

mod serial;
mod threaded;
mod window;

pub use serial::*;
pub use threaded::*;
pub use window::*;

use crate::error::*;

pub trait Topology: Sync {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn window(&self) -> &ProcessWindow;

    /// The windows of every process, in rank order.
    fn windows(&self) -> &[ProcessWindow];

    /// Refresh the ghost points of `buffer` from the processes that own them.
    ///
    /// `buffer` holds `ncomp` components over [`ProcessWindow::buffer`],
    /// component-major. This is collective: every process must call it the
    /// same number of times, and no process reads a ghost before all owners
    /// have finished writing.
    fn exchange(&self, buffer: &mut [f64], ncomp: usize) -> SolverResult<()>;

    /// Stop the whole process group.
    fn abort(&self, error: &SolverError) -> ! {
        log::error!("rank {} aborting: {}", self.rank(), error);
        std::process::exit(1)
    }
}
