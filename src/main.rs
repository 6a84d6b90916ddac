// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CRPT Document Client
//!
//! Submits a single document to the CRPT document-creation endpoint through
//! the process-wide admission gate and prints the raw response body.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables, with command-line
//! overrides for the gate:
//!
//! - `CRPT_API_URL`: document creation URL
//! - `CRPT_RATE_LIMIT`: submissions per window (default: 5)
//! - `CRPT_WINDOW_MS`: window length in milliseconds (default: 1000)
//! - `CRPT_REQUEST_TIMEOUT_SECS`: HTTP request timeout (default: 30)

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crpt_api::{config::Config, Document, RateGate, Submitter};

#[derive(Parser)]
#[command(name = "crpt-api", about = "Rate-limited CRPT document submission")]
struct Args {
    /// JSON document to submit (an empty document when omitted)
    #[arg(long)]
    document: Option<PathBuf>,

    /// Detached signature sent in the Signature header
    #[arg(long, default_value = "signature")]
    signature: String,

    /// Override the number of submissions per window
    #[arg(long)]
    capacity: Option<u32>,

    /// Override the window length in milliseconds
    #[arg(long)]
    window_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing on stderr; stdout carries the response body
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::from_env().with_gate_overrides(args.capacity, args.window_ms);
    info!(
        url = %config.api.url,
        capacity = config.gate.capacity,
        window_ms = config.gate.window_ms,
        "Starting CRPT document client"
    );

    let gate = Arc::new(RateGate::from_config(&config.gate)?);
    let submitter = Submitter::http(gate, &config.api)?;

    let document = match &args.document {
        Some(path) => load_document(path).await?,
        None => Document::default(),
    };

    let response = submitter.submit(&document, &args.signature).await?;
    println!("{}", response);

    Ok(())
}

/// Read a document in wire format from disk.
async fn load_document(path: &Path) -> anyhow::Result<Document> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Document::from_json(&raw).with_context(|| format!("parsing {}", path.display()))
}
