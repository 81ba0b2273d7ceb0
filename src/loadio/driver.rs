use super::{affinity, worker_count};
use std::hint;
use std::thread;
use std::time::{Duration, Instant};

/// Drives the shared CPU busy or idle until a monotonically advancing
/// deadline, one chip at a time.
///
/// The deadline cursor is advanced by delta from its previous value, never
/// reloaded from the current clock: phase error would otherwise accumulate
/// with the latency of every clock read and attenuate the useful signal at
/// the receiver. When the cursor falls behind the wall clock under scheduler
/// preemption, the next idle chip absorbs the slack because the cursor keeps
/// advancing in chip increments.
#[derive(Debug)]
pub struct LoadDriver {
    deadline: Instant,
    workers: usize,
}

impl LoadDriver {
    /// `max_concurrency` caps the worker pool; the effective count is
    /// clamped to the host parallelism. With a single worker the driver pins
    /// itself to CPU 0 and burns on the calling thread.
    pub fn new(max_concurrency: usize) -> Self {
        let workers = worker_count(max_concurrency);
        if workers == 1 {
            affinity::pin_current_thread(0);
        }
        Self {
            deadline: Instant::now(),
            workers,
        }
    }

    /// Hold the medium at `level` for `duration`, blocking until the
    /// deadline cursor is reached. Never fails.
    pub fn drive(&mut self, level: bool, duration: Duration) {
        self.deadline += duration;
        let deadline = self.deadline;
        if level {
            if self.workers > 1 {
                thread::scope(|scope| {
                    for _ in 0..self.workers {
                        scope.spawn(move || burn_until(deadline));
                    }
                });
            } else {
                burn_until(deadline);
            }
        } else {
            thread::sleep(deadline.saturating_duration_since(Instant::now()));
        }
    }
}

/// Tight compute loop claiming as much CPU time as the host permits.
/// The inner wrap-around counter generates load between possibly blocking
/// clock reads; `black_box` keeps the optimizer from deleting it.
fn burn_until(deadline: Instant) {
    while Instant::now() < deadline {
        let mut spin: u16 = 1;
        while spin != 0 {
            spin = hint::black_box(spin).wrapping_add(1);
        }
    }
}
