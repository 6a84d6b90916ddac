// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Stub document-creation endpoint served over real HTTP.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const CREATE_PATH: &str = "/api/v3/lk/documents/create";

/// A request captured by the stub.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub content_type: Option<String>,
    pub signature: Option<String>,
    pub body: String,
}

struct StubState {
    status: StatusCode,
    response: &'static str,
    captured: Mutex<Vec<CapturedRequest>>,
}

/// Handle to a running stub endpoint.
#[derive(Clone)]
pub struct StubEndpoint {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubEndpoint {
    /// Start a stub that answers every create request with `status` and `response`.
    pub async fn start(status: StatusCode, response: &'static str) -> Self {
        let state = Arc::new(StubState {
            status,
            response,
            captured: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(CREATE_PATH, post(create))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Full URL of the create endpoint.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, CREATE_PATH)
    }

    /// Requests received so far.
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.state.captured.lock().unwrap().clone()
    }
}

async fn create(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.captured.lock().unwrap().push(CapturedRequest {
        content_type: header_value(header::CONTENT_TYPE.as_str()),
        signature: header_value("signature"),
        body,
    });

    (state.status, state.response)
}

/// A local address with nothing listening on it.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, CREATE_PATH)
}
