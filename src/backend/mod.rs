//! Backend access layer.
//!
//! Every portal route eventually talks to the backend model/record service.
//! This module provides the pieces shared by all of them:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Route handlers             │
//! └────────────────────┬────────────────────┘
//!                      │ BackendRequest
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Backend trait              │
//! │  (one attempt, deadline, 3-way result)  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               HttpBackend               │
//! │   (reqwest + forwarded credentials)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! A call resolves to a [`BackendResponse`] for a 2xx JSON answer, or to one of the
//! [`BackendError`] buckets: `Unavailable`, `Rejected` or `Malformed`.

mod client;
mod forward;

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::Value;

use crate::error::BackendError;

pub use client::{HttpBackend, DEFAULT_BACKEND_TIMEOUT, DEFAULT_BACKEND_URL};
pub use forward::ForwardedHeaders;

/// A single call to the backend service.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// HTTP method
    pub method: Method,

    /// Path relative to the backend base address (e.g. "admin/doctors")
    pub path: String,

    /// Optional JSON body
    pub body: Option<Value>,

    /// Credentials forwarded from the inbound request
    pub headers: ForwardedHeaders,
}

impl BackendRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: ForwardedHeaders::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_headers(mut self, headers: ForwardedHeaders) -> Self {
        self.headers = headers;
        self
    }
}

/// A 2xx JSON answer from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl BackendResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

/// Client for the backend model/record service.
///
/// Implementations must make exactly one attempt per call and never let a
/// transport error escape unclassified.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Perform the call and classify the outcome.
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;

    /// Base address of the backend, for logging.
    fn base_url(&self) -> &str;
}
