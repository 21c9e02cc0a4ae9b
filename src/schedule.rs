//! Fixed-interval job scheduling.
//!
//! Coarse polling loop: every tick, check whether the interval has elapsed
//! since the job last completed and, if so, run the job inline. The loop
//! never advances while the job is running, so two runs can never overlap -
//! a job that outruns the interval is simply followed back-to-back by the
//! next one. Spacing is measured from completion, not start; there is no
//! drift compensation.

use crate::error::{Result, SyncError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default poll granularity for the scheduling loop
const TICK: Duration = Duration::from_secs(1);

pub struct Scheduler {
    interval: Duration,
    tick: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(SyncError::Config(
                "interval must be a positive duration".to_string(),
            ));
        }
        Ok(Self {
            interval,
            tick: TICK,
        })
    }

    /// Override the poll granularity. Mainly for tests; the default one
    /// second tick is deliberately coarse.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Invoke `job` repeatedly until `stop` is set.
    ///
    /// The first invocation happens one full interval after `run` is called;
    /// each subsequent one, one interval after the previous invocation
    /// returned. The stop flag is checked once per tick, never mid-job.
    pub fn run<F>(&self, stop: Arc<AtomicBool>, mut job: F)
    where
        F: FnMut(),
    {
        let mut last_finished = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            if last_finished.elapsed() >= self.interval {
                job();
                last_finished = Instant::now();
            }
            thread::sleep(self.tick);
        }
    }
}
