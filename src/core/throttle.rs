// src/core/throttle.rs
// Fixed-interval pacing: at most one permit per interval, no burst.

use std::thread;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type Direct = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub struct Throttle {
    limiter: Option<Direct>,
    interval: Duration,
    clock: DefaultClock,
}

impl Throttle {
    /// A zero interval disables pacing entirely.
    pub fn every(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(RateLimiter::direct);
        Self { limiter, interval, clock: DefaultClock::default() }
    }

    pub fn every_ms(ms: u64) -> Self {
        Self::every(Duration::from_millis(ms))
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Block until the next slot is free, then take it.
    /// The first call returns immediately.
    pub fn wait(&self) {
        let Some(limiter) = &self.limiter else { return };
        loop {
            match limiter.check() {
                Ok(()) => return,
                Err(not_until) => {
                    let pause = not_until.wait_time_from(self.clock.now());
                    tracing::trace!(?pause, "throttled");
                    thread::sleep(pause);
                }
            }
        }
    }

    /// Take a slot now, so the next `wait()` blocks a full interval from
    /// this moment whatever happened before.
    pub fn restart(&mut self) {
        if self.limiter.is_none() { return; }
        let limiter = Quota::with_period(self.interval).map(RateLimiter::direct);
        if let Some(l) = &limiter {
            let _ = l.check();
        }
        self.limiter = limiter;
    }
}
