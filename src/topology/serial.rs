use crate::error::*;
use crate::topology::*;
use crate::util::*;

/// One process, no ghosts, nothing to exchange.
#[derive(Debug, Clone)]
pub struct SerialTopology {
    window: ProcessWindow,
}

impl SerialTopology {
    pub fn new(nx: Coord3) -> Self {
        SerialTopology {
            window: ProcessWindow::whole(nx),
        }
    }
}

impl Topology for SerialTopology {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn window(&self) -> &ProcessWindow {
        &self.window
    }

    fn windows(&self) -> &[ProcessWindow] {
        std::slice::from_ref(&self.window)
    }

    fn exchange(&self, buffer: &mut [f64], ncomp: usize) -> SolverResult<()> {
        debug_assert_eq!(buffer.len(), ncomp * self.window.buffer().buffer_size());
        Ok(())
    }
}
