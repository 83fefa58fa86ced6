//! Test utilities for integration tests.
//!
//! This module provides a scripted in-memory backend and helpers for building
//! requests against the router and reading its responses.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use medportal_gateway::backend::{Backend, BackendRequest, BackendResponse};
use medportal_gateway::error::BackendError;

// =============================================================================
// Mock Backend with Request Tracking
// =============================================================================

type Scripted = Result<BackendResponse, BackendError>;

/// A scripted backend that records every call it receives.
///
/// Responses are keyed by method and path. Unscripted calls fail as
/// `Unavailable`, like a backend that is not running.
pub struct MockBackend {
    routes: HashMap<(Method, String), Scripted>,
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<BackendRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Answer `method path` with `status` and a JSON `body`.
    ///
    /// Non-2xx statuses are delivered as rejections, as the HTTP client would.
    pub fn with_response(mut self, method: Method, path: &str, status: u16, body: Value) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        let outcome = if status.is_success() {
            Ok(BackendResponse::new(status, body))
        } else {
            Err(BackendError::Rejected { status, body })
        };
        self.routes.insert((method, path.to_string()), outcome);
        self
    }

    /// Fail `method path` with `error`.
    pub fn with_error(mut self, method: Method, path: &str, error: BackendError) -> Self {
        self.routes.insert((method, path.to_string()), Err(error));
        self
    }

    /// Tracking handle that stays valid after the backend moves into a router.
    pub fn tracker(&self) -> RequestTracker {
        RequestTracker {
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let key = (request.method.clone(), request.path.clone());
        self.requests.write().await.push(request);

        match self.routes.get(&key) {
            Some(outcome) => outcome.clone(),
            None => Err(BackendError::Unavailable(format!(
                "connection refused: {} {}",
                key.0, key.1
            ))),
        }
    }

    fn base_url(&self) -> &str {
        "mock://backend"
    }
}

/// Read-only view of the calls a [`MockBackend`] received.
#[derive(Clone)]
pub struct RequestTracker {
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<BackendRequest>>>,
}

impl RequestTracker {
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<BackendRequest> {
        self.requests.read().await.clone()
    }

    pub async fn last_request(&self) -> BackendRequest {
        self.requests
            .read()
            .await
            .last()
            .cloned()
            .expect("backend received no requests")
    }
}

// =============================================================================
// Request / Response Helpers
// =============================================================================

/// Build a request with a JSON body.
pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request with a raw body.
pub fn raw_request(method: Method, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Build a GET request carrying a `Cookie` header.
pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).expect("response body is JSON")
}

/// All `Set-Cookie` values on a response.
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Value of the `user_role` cookie installed by a response, if any.
pub fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    set_cookies(headers).into_iter().find_map(|cookie| {
        let first = cookie.split(';').next()?.trim().to_string();
        first
            .strip_prefix("user_role=")
            .map(|value| urlencoding::decode(value).unwrap().into_owned())
    })
}
