// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rate-limited document submission.
//!
//! Every submission passes through the shared [`RateGate`] before it reaches
//! the network. Documents for imported goods are rejected up front and never
//! consume an admission.

use crate::config::ApiConfig;
use crate::document::Document;
use crate::gate::{Clock, GateError, RateGate, TokioClock};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Submission error types.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Document creation is skipped for imported goods")]
    SkippedDocument,

    #[error("Admission failed: {0}")]
    Gate(#[from] GateError),

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Delivers a serialized document to the remote endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` with the detached `signature` and return the response body.
    async fn post_json(&self, body: String, signature: &str) -> Result<String, SubmitError>;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint.
    pub fn new(config: &ApiConfig) -> Result<Self, SubmitError> {
        let url = Url::parse(&config.url).map_err(|e| SubmitError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, url })
    }

    /// Endpoint this transport posts to.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, body: String, signature: &str) -> Result<String, SubmitError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("Signature", signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %self.url, "Endpoint returned non-success status");
        }
        debug!(%status, "Response received");

        Ok(response.text().await?)
    }
}

/// Submits documents through the shared admission gate.
pub struct Submitter<T = HttpTransport, C = TokioClock> {
    gate: Arc<RateGate<C>>,
    transport: T,
}

impl<C: Clock> Submitter<HttpTransport, C> {
    /// Create a submitter that posts over HTTP.
    pub fn http(gate: Arc<RateGate<C>>, config: &ApiConfig) -> Result<Self, SubmitError> {
        Ok(Self::new(gate, HttpTransport::new(config)?))
    }
}

impl<T: Transport, C: Clock> Submitter<T, C> {
    /// Create a submitter with an explicit transport.
    pub fn new(gate: Arc<RateGate<C>>, transport: T) -> Self {
        Self { gate, transport }
    }

    /// The shared gate.
    pub fn gate(&self) -> &Arc<RateGate<C>> {
        &self.gate
    }

    /// Submit a document, waiting for admission as long as needed.
    pub async fn submit(&self, document: &Document, signature: &str) -> Result<String, SubmitError> {
        check_importable(document)?;
        let admission = self.gate.acquire().await;
        debug!(remaining = admission.remaining, "Admitted");
        self.send(document, signature).await
    }

    /// Submit a document, failing with [`GateError::Timeout`] if no admission
    /// is granted by `deadline`.
    pub async fn submit_until(
        &self,
        document: &Document,
        signature: &str,
        deadline: Instant,
    ) -> Result<String, SubmitError> {
        check_importable(document)?;
        let admission = self.gate.acquire_until(deadline).await?;
        debug!(remaining = admission.remaining, "Admitted");
        self.send(document, signature).await
    }

    /// Submit a document, failing with [`GateError::Cancelled`] if `token` is
    /// cancelled before admission.
    pub async fn submit_with_cancel(
        &self,
        document: &Document,
        signature: &str,
        token: &CancellationToken,
    ) -> Result<String, SubmitError> {
        check_importable(document)?;
        let admission = self.gate.acquire_with_cancel(token).await?;
        debug!(remaining = admission.remaining, "Admitted");
        self.send(document, signature).await
    }

    /// The admission is spent from here on, whatever the outcome.
    async fn send(&self, document: &Document, signature: &str) -> Result<String, SubmitError> {
        let body = document.to_json()?;
        let response = self.transport.post_json(body, signature).await?;
        info!(doc_id = ?document.id, bytes = response.len(), "Document submitted");
        Ok(response)
    }
}

fn check_importable(document: &Document) -> Result<(), SubmitError> {
    if document.import_request {
        info!(doc_id = ?document.id, "Skipping document for imported goods");
        return Err(SubmitError::SkippedDocument);
    }
    Ok(())
}
