// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the CRPT document client.
//!
//! Defaults mirror the reference deployment: five submissions per second
//! against the production document-creation endpoint.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Production endpoint for document creation.
pub const DEFAULT_API_URL: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Configuration for the document client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Admission gate configuration
    #[serde(default)]
    pub gate: GateConfig,

    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Admission gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Maximum submissions per window (default: 5)
    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Window length in milliseconds (default: 1000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Document creation URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Default value functions
fn default_capacity() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    1000
}

fn default_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            window_ms: default_window_ms(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GateConfig {
    /// Get the window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl ApiConfig {
    /// Get the request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `CRPT_API_URL`: document creation URL
    /// - `CRPT_RATE_LIMIT`: submissions per window
    /// - `CRPT_WINDOW_MS`: window length in milliseconds
    /// - `CRPT_REQUEST_TIMEOUT_SECS`: HTTP request timeout
    ///
    /// Missing or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            gate: GateConfig {
                capacity: parsed(&lookup, "CRPT_RATE_LIMIT").unwrap_or_else(default_capacity),
                window_ms: parsed(&lookup, "CRPT_WINDOW_MS").unwrap_or_else(default_window_ms),
            },
            api: ApiConfig {
                url: lookup("CRPT_API_URL").unwrap_or_else(default_url),
                request_timeout_secs: parsed(&lookup, "CRPT_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(default_request_timeout_secs),
            },
        }
    }
}

impl Config {
    /// Apply command-line gate overrides on top of the loaded configuration.
    pub fn with_gate_overrides(mut self, capacity: Option<u32>, window_ms: Option<u64>) -> Self {
        if let Some(capacity) = capacity {
            self.gate.capacity = capacity;
        }
        if let Some(window_ms) = window_ms {
            self.gate.window_ms = window_ms;
        }
        self
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
