// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wall-clock access.
//!
//! Times are Unix seconds as `f64`, the unit the capture log persists.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> f64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Whole seconds elapsed since `epoch`, clamped at zero.
pub fn elapsed_seconds(now: f64, epoch: f64) -> u64 {
    (now - epoch).max(0.0).floor() as u64
}

/// A clock that only moves when told to. Clones share the same time.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<f64>>);

#[cfg(test)]
impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(start)))
    }

    pub fn advance(&self, seconds: f64) {
        self.0.set(self.0.get() + seconds);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_seconds_floors_and_clamps() {
        assert_eq!(elapsed_seconds(1_000.9, 1_000.0), 0);
        assert_eq!(elapsed_seconds(4_725.5, 1_000.0), 3_725);
        assert_eq!(elapsed_seconds(900.0, 1_000.0), 0);
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new(10.0);
        let other = clock.clone();
        other.advance(2.5);
        assert_eq!(clock.now(), 12.5);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800.0);
    }
}
