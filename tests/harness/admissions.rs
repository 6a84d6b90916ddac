// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Admission log and window-bound checks.

use std::time::Duration;
use tokio::time::Instant;

/// Summary of a checked admission log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReport {
    /// Number of windows observed
    pub windows: usize,
    /// Largest number of admissions in any single window
    pub max_per_window: usize,
    /// Largest number of admissions in any span shorter than one window
    pub max_in_span: usize,
}

/// Replay admission times through fixed-window accounting.
///
/// A window starts at the first admission at or after the previous window's
/// end, which is exactly where the gate restarts it.
pub fn check_windows(times: &[Instant], window: Duration) -> WindowReport {
    let mut sorted = times.to_vec();
    sorted.sort();

    let mut windows = 0;
    let mut max_per_window = 0;
    let mut current: Option<(Instant, usize)> = None;

    for &t in &sorted {
        current = match current {
            Some((start, count)) if t < start + window => Some((start, count + 1)),
            _ => {
                windows += 1;
                Some((t, 1))
            }
        };
        if let Some((_, count)) = current {
            max_per_window = max_per_window.max(count);
        }
    }

    WindowReport {
        windows,
        max_per_window,
        max_in_span: max_in_open_span(&sorted, window),
    }
}

/// Most admissions inside any half-open span `[t, t + window)`.
fn max_in_open_span(sorted: &[Instant], window: Duration) -> usize {
    let mut best = 0;
    let mut lo = 0;
    for hi in 0..sorted.len() {
        while sorted[hi] >= sorted[lo] + window {
            lo += 1;
        }
        best = best.max(hi - lo + 1);
    }
    best
}

/// Upper bound on admissions across a span of `elapsed`, allowing for drift.
pub fn total_bound(capacity: u32, window: Duration, elapsed: Duration) -> usize {
    let windows = elapsed.as_nanos().div_ceil(window.as_nanos()) as usize;
    capacity as usize * windows + capacity as usize
}
