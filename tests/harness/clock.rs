// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Manually advanced clock.

use crpt_api::Clock;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock reading "t = 0".
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        })
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    /// Jump to `t` milliseconds after the clock's origin.
    pub fn set_ms(&self, t: u64) {
        let target = Duration::from_millis(t);
        let mut offset = self.offset.lock().unwrap();
        assert!(target >= *offset, "ManualClock must not go backwards");
        *offset = target;
    }

    /// The instant `t` milliseconds after the origin.
    pub fn at_ms(&self, t: u64) -> Instant {
        self.base + Duration::from_millis(t)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}
