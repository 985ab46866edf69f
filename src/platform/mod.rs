//! Platform abstraction layer
//!
//! The simulation is pure; the only host service the controller needs is a
//! wall-clock for the invincibility and banner timers. Tests drive a
//! [`ManualClock`] instead of real time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic wall-clock in milliseconds
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Real clock measured from process start
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock for tests
#[derive(Default)]
pub struct ManualClock {
    ms: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance(&self, ms: u64) {
        self.ms.set(self.ms.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.ms.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.ms.get()
    }
}
