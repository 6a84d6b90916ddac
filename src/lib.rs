// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CRPT Document Client
//!
//! Submits documents to the CRPT document-creation endpoint without ever
//! exceeding a configured number of submissions per time window:
//!
//! - Fixed-window admission gate shared by all concurrent callers
//! - Timeout and cancellation for callers waiting on the gate
//! - Import documents skipped before they consume an admission
//! - Signed JSON submission over HTTP

pub mod config;
pub mod document;
pub mod gate;
pub mod submitter;

pub use config::Config;
pub use document::{Description, Document, Product};
pub use gate::{Admission, Clock, GateError, RateGate, TokioClock, WindowSnapshot};
pub use submitter::{HttpTransport, SubmitError, Submitter, Transport};
