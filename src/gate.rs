// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window admission gate.
//!
//! A single [`RateGate`] is shared by every caller in the process. It admits
//! at most `capacity` operations per window and suspends further callers
//! until the window rolls over. Capacity is reclaimed only by time: there is
//! no release, so a slow or failed operation still counts against its window.
//!
//! The window is fixed, not sliding. It restarts at the instant the first
//! caller observes that it has expired, so window boundaries drift with call
//! timing and up to `2 * capacity - 1` admissions can land in a short span
//! that straddles a reset.

use crate::config::GateConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Gate error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Invalid gate configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Admission cancelled while waiting for capacity")]
    Cancelled,

    #[error("Admission not granted before the deadline")]
    Timeout,
}

/// Source of time for window accounting.
pub trait Clock: Send + Sync {
    /// Current monotonic time.
    fn now(&self) -> Instant;
}

/// Clock backed by the tokio timer.
///
/// Follows tokio's paused clock in tests, which keeps window boundaries
/// deterministic under `#[tokio::test(start_paused = true)]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// A granted admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Clock reading at the moment of admission
    pub admitted_at: Instant,
    /// Admissions still available in the current window
    pub remaining: u32,
}

/// Point-in-time view of the gate's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Admissions granted in the current window
    pub used: u32,
    /// Maximum admissions per window
    pub capacity: u32,
    /// Start of the current window
    pub window_start: Instant,
    /// Time until the current window expires (zero once expired)
    pub resets_in: Duration,
}

/// Accounting state. Both fields only change together under the gate lock.
#[derive(Debug)]
struct Window {
    start: Instant,
    used: u32,
}

impl Window {
    /// Restart the window if it has expired as of `now`.
    fn roll(&mut self, now: Instant, length: Duration) -> bool {
        if now.saturating_duration_since(self.start) >= length {
            self.start = now;
            self.used = 0;
            true
        } else {
            false
        }
    }

    fn remaining(&self, now: Instant, length: Duration) -> Duration {
        length.saturating_sub(now.saturating_duration_since(self.start))
    }
}

/// Process-wide fixed-window rate gate.
pub struct RateGate<C = TokioClock> {
    capacity: u32,
    window: Duration,
    state: Mutex<Window>,
    /// Broadcast whenever a caller restarts the window
    resets: Notify,
    clock: C,
}

impl RateGate<TokioClock> {
    /// Create a gate driven by the tokio clock.
    pub fn new(capacity: u32, window: Duration) -> Result<Self, GateError> {
        Self::with_clock(capacity, window, TokioClock)
    }

    /// Create a gate from configuration.
    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        Self::new(config.capacity, config.window_duration())
    }
}

impl<C: Clock> RateGate<C> {
    /// Create a gate with an explicit clock.
    ///
    /// Fails with [`GateError::InvalidConfiguration`] when `capacity` is zero
    /// or `window` is empty.
    pub fn with_clock(capacity: u32, window: Duration, clock: C) -> Result<Self, GateError> {
        if capacity == 0 {
            return Err(GateError::InvalidConfiguration(
                "capacity must be at least 1".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(GateError::InvalidConfiguration(
                "window duration must be greater than zero".to_string(),
            ));
        }

        let start = clock.now();
        Ok(Self {
            capacity,
            window,
            state: Mutex::new(Window { start, used: 0 }),
            resets: Notify::new(),
            clock,
        })
    }

    /// Maximum admissions per window.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Roll the window if needed and take a slot if one is free.
    fn admit(&self, window: &mut Window, now: Instant) -> Option<Admission> {
        if window.roll(now, self.window) {
            trace!(capacity = self.capacity, "Window reset");
            self.resets.notify_waiters();
        }

        if window.used < self.capacity {
            window.used += 1;
            Some(Admission {
                admitted_at: now,
                remaining: self.capacity - window.used,
            })
        } else {
            None
        }
    }

    /// Wait until the current window has room, then take one admission.
    ///
    /// The slot is taken in the same poll that completes the future, so
    /// dropping it early never charges the caller.
    pub async fn acquire(&self) -> Admission {
        loop {
            let reset = self.resets.notified();
            tokio::pin!(reset);

            let wait = {
                let mut window = self.state.lock().await;
                let now = self.clock.now();
                if let Some(admission) = self.admit(&mut window, now) {
                    return admission;
                }
                // Register before unlocking so a reset by another caller is not missed.
                reset.as_mut().enable();
                window.remaining(now, self.window)
            };

            debug!(?wait, capacity = self.capacity, "Gate full, waiting for next window");
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut reset => {}
            }
        }
    }

    /// Like [`acquire`](Self::acquire), but give up at `deadline`.
    ///
    /// The deadline is measured on the tokio timer. Capacity that is already
    /// free is granted even when the deadline has passed.
    pub async fn acquire_until(&self, deadline: Instant) -> Result<Admission, GateError> {
        tokio::time::timeout_at(deadline, self.acquire())
            .await
            .map_err(|_| {
                debug!("Admission timed out");
                GateError::Timeout
            })
    }

    /// Like [`acquire`](Self::acquire), but give up after `timeout`.
    ///
    /// A timeout too large to express as a deadline waits without limit.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<Admission, GateError> {
        tokio::time::timeout(timeout, self.acquire())
            .await
            .map_err(|_| {
                debug!(?timeout, "Admission timed out");
                GateError::Timeout
            })
    }

    /// Like [`acquire`](Self::acquire), but stop waiting once `token` is
    /// cancelled. An already-cancelled token is never admitted.
    pub async fn acquire_with_cancel(
        &self,
        token: &CancellationToken,
    ) -> Result<Admission, GateError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Admission cancelled");
                Err(GateError::Cancelled)
            }
            admission = self.acquire() => Ok(admission),
        }
    }

    /// Take an admission only if the current window has room.
    pub async fn try_acquire(&self) -> Option<Admission> {
        let mut window = self.state.lock().await;
        let now = self.clock.now();
        self.admit(&mut window, now)
    }

    /// Current window state. Does not roll an expired window.
    pub async fn snapshot(&self) -> WindowSnapshot {
        let window = self.state.lock().await;
        let now = self.clock.now();
        WindowSnapshot {
            used: window.used,
            capacity: self.capacity,
            window_start: window.start,
            resets_in: window.remaining(now, self.window),
        }
    }
}

impl<C> fmt::Debug for RateGate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateGate")
            .field("capacity", &self.capacity)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
