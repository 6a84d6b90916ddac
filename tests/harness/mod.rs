// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the CRPT document client.
//!
//! Provides a hand-driven clock, an admission log for checking window
//! bounds, an in-memory transport, and a stub HTTP endpoint.

#![allow(dead_code)]

pub mod admissions;
pub mod clock;
pub mod stub;
