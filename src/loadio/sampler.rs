use super::builtin::SAMPLE_AVERAGING_FACTOR;
use super::{affinity, worker_count};
use std::hint;
use std::thread;
use std::time::{Duration, Instant};

/// Infers the medium level by counting busy-loop ticks per sample window.
///
/// A depressed tick rate means the sender is consuming cycles on the shared
/// cores right now. The rate is compared against a first-order low-pass
/// baseline, which removes the DC component: host CPU speed and steady
/// background load. The window deadline follows the same anti-drift cursor
/// discipline as the transmit driver.
#[derive(Debug)]
pub struct LoadSampler {
    deadline: Instant,
    window: Duration,
    baseline: Option<f64>,
    workers: usize,
}

impl LoadSampler {
    pub fn new(window: Duration, max_concurrency: usize) -> Self {
        let workers = worker_count(max_concurrency);
        if workers == 1 {
            affinity::pin_current_thread(0);
        }
        Self {
            deadline: Instant::now(),
            window,
            baseline: None,
            workers,
        }
    }

    /// Returns true if the medium is inferred to be driven high.
    ///
    /// Worker counters are thread-private and summed after join; the only
    /// cross-thread traffic is the joined return values.
    pub fn sample(&mut self) -> bool {
        self.deadline += self.window;
        let deadline = self.deadline;
        let start = Instant::now();
        let ticks = if self.workers > 1 {
            thread::scope(|scope| {
                let pool: Vec<_> = (0..self.workers)
                    .map(|_| scope.spawn(move || count_until(deadline)))
                    .collect();
                pool.into_iter()
                    .map(|worker| worker.join().unwrap_or(0))
                    .sum::<u64>()
            })
        } else {
            count_until(deadline)
        };
        let elapsed = start.elapsed().as_nanos().max(1);
        let rate = ticks as f64 / elapsed as f64;

        let baseline = self.baseline.get_or_insert(rate);
        *baseline += (rate - *baseline) / SAMPLE_AVERAGING_FACTOR;
        rate < *baseline
    }
}

fn count_until(deadline: Instant) -> u64 {
    let mut ticks: u64 = 0;
    while Instant::now() < deadline {
        ticks = hint::black_box(ticks) + 1;
    }
    ticks
}
