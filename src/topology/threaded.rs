use crate::error::*;
use crate::topology::*;
use crate::util::*;
use std::sync::{Arc, Barrier, Mutex};

struct Shared {
    ranks: Coord3,
    windows: Vec<ProcessWindow>,
    mailbox: Vec<Mutex<Vec<f64>>>,
    barrier: Barrier,
}

/// A Cartesian process grid emulated with one thread per rank.
///
/// Every rank runs the same code on its own window, SPMD style. Ghost
/// exchange goes through a shared mailbox, one slot per rank, fenced by
/// barriers.
pub struct ThreadedCartesian {
    rank: usize,
    cart: Coord3,
    shared: Arc<Shared>,
}

/// Even split of `n` points over `p` ranks, the first `n % p` ranks get one
/// extra point. Returns `(min, count)` for rank `c`.
fn split(n: i32, p: i32, c: i32) -> (i32, i32) {
    let base = n / p;
    let rem = n % p;
    let count = base + i32::from(c < rem);
    let min = c * base + c.min(rem);
    (min, count)
}

impl ThreadedCartesian {
    /// Split `nx` over `ranks` processes per dimension and run `f` on each.
    ///
    /// `ghost` is the ghost width at process cuts. Results come back in rank
    /// order.
    pub fn run<R, F>(
        nx: Coord3,
        ranks: Coord3,
        ghost: i32,
        f: F,
    ) -> SolverResult<Vec<R>>
    where
        R: Send,
        F: Fn(ThreadedCartesian) -> R + Sync,
    {
        if ranks.iter().any(|r| *r < 1) {
            return Err(SolverError::Config(format!(
                "rank counts must be positive, got {:?}",
                ranks.as_slice()
            )));
        }
        let mut windows = Vec::new();
        for c0 in 0..ranks[0] {
            for c1 in 0..ranks[1] {
                for c2 in 0..ranks[2] {
                    let cart = vector![c0, c1, c2];
                    let mut window = ProcessWindow::whole(nx);
                    for d in 0..NDIM_MAX {
                        let (min, count) = split(nx[d], ranks[d], cart[d]);
                        if count < ghost.max(1) {
                            return Err(SolverError::Config(format!(
                                "{} points in dimension {} cannot be split over {} ranks",
                                nx[d], d, ranks[d]
                            )));
                        }
                        window.xm_loc[d] = min;
                        window.nx_loc[d] = count;
                        if cart[d] > 0 {
                            window.xm_ghost[d] = ghost;
                        }
                        if cart[d] < ranks[d] - 1 {
                            window.xp_ghost[d] = ghost;
                        }
                    }
                    windows.push(window);
                }
            }
        }

        let size = windows.len();
        log::info!("threaded topology: {} ranks {:?}", size, ranks.as_slice());
        let shared = Arc::new(Shared {
            ranks,
            mailbox: (0..size).map(|_| Mutex::new(Vec::new())).collect(),
            windows,
            barrier: Barrier::new(size),
        });

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    let topology = ThreadedCartesian {
                        rank,
                        cart: linear_to_cart(rank, &ranks),
                        shared: shared.clone(),
                    };
                    let f = &f;
                    s.spawn(move || f(topology))
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, h)| {
                    h.join().map_err(|_| {
                        SolverError::Exchange(format!("rank {} panicked", rank))
                    })
                })
                .collect()
        })
    }

    pub fn cart(&self) -> Coord3 {
        self.cart
    }

    fn neighbor(&self, d: usize, step: i32) -> Option<usize> {
        let mut c = self.cart;
        c[d] += step;
        if c[d] < 0 || c[d] >= self.shared.ranks[d] {
            return None;
        }
        Some(cart_to_linear(&c, &self.shared.ranks))
    }

    fn post(&self, buffer: &[f64]) -> SolverResult<()> {
        let mut slot = self.shared.mailbox[self.rank]
            .lock()
            .map_err(|_| SolverError::Exchange("mailbox poisoned".to_string()))?;
        slot.clear();
        slot.extend_from_slice(buffer);
        Ok(())
    }

    /// Copy `ghosts` from the posted buffer of `source`.
    fn fetch(
        &self,
        source: usize,
        ghosts: &AABB<3>,
        buffer: &mut [f64],
        ncomp: usize,
    ) -> SolverResult<()> {
        let aabb = self.window().buffer();
        let npts = aabb.buffer_size();
        let source_aabb = self.shared.windows[source].buffer();
        let source_npts = source_aabb.buffer_size();
        debug_assert!(source_aabb.contains_aabb(ghosts));

        let posted = self.shared.mailbox[source]
            .lock()
            .map_err(|_| SolverError::Exchange("mailbox poisoned".to_string()))?;
        for c in ghosts.coord_iter() {
            let dst = aabb.coord_to_linear(&c);
            let src = source_aabb.coord_to_linear(&c);
            for comp in 0..ncomp {
                buffer[comp * npts + dst] = posted[comp * source_npts + src];
            }
        }
        Ok(())
    }
}

fn linear_to_cart(rank: usize, ranks: &Coord3) -> Coord3 {
    indexing::linear_to_coord(rank, ranks)
}

fn cart_to_linear(cart: &Coord3, ranks: &Coord3) -> usize {
    indexing::coord_to_linear(cart, ranks)
}

impl Topology for ThreadedCartesian {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.windows.len()
    }

    fn window(&self) -> &ProcessWindow {
        &self.shared.windows[self.rank]
    }

    fn windows(&self) -> &[ProcessWindow] {
        &self.shared.windows
    }

    fn exchange(&self, buffer: &mut [f64], ncomp: usize) -> SolverResult<()> {
        profiling::scope!("exchange");
        let window = *self.window();
        let aabb = window.buffer();
        debug_assert_eq!(buffer.len(), ncomp * aabb.buffer_size());

        // Dimension by dimension, so that edge and corner ghosts pick up
        // values the neighbors received in earlier passes.
        for d in 0..NDIM_MAX {
            if self.shared.ranks[d] == 1 {
                continue;
            }
            self.post(buffer)?;
            self.shared.barrier.wait();

            if let Some(low) = self.neighbor(d, -1) {
                let lo = window.xm_loc[d] - window.xm_ghost[d];
                let ghosts = aabb.slab(d, lo, window.xm_loc[d] - 1);
                self.fetch(low, &ghosts, buffer, ncomp)?;
            }
            if let Some(high) = self.neighbor(d, 1) {
                let hi = window.xp_loc(d) + window.xp_ghost[d];
                let ghosts = aabb.slab(d, window.xp_loc(d) + 1, hi);
                self.fetch(high, &ghosts, buffer, ncomp)?;
            }
            self.shared.barrier.wait();
        }
        Ok(())
    }
}
