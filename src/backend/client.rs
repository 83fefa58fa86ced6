//! reqwest-backed implementation of [`Backend`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{Backend, BackendRequest, BackendResponse};
use crate::error::{BackendError, ClientError};

/// Default backend base address (local loopback).
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default deadline for a single backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the backend service.
///
/// The base address is resolved once at construction. Each call is a single
/// attempt bounded by `timeout`; an elapsed deadline is reported as
/// [`BackendError::Unavailable`], the same bucket as a refused connection.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Full URL for a backend path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn exchange(&self, request: BackendRequest) -> Result<(StatusCode, Bytes), BackendError> {
        let url = self.endpoint(&request.path);
        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers.to_header_map());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(describe_transport_error(&e)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Unavailable(describe_transport_error(&e)))?;

        Ok((status, body))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let method = request.method.clone();
        let path = request.path.clone();

        let (status, body) = match tokio::time::timeout(self.timeout, self.exchange(request)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(BackendError::Unavailable(format!(
                    "deadline of {}ms exceeded",
                    self.timeout.as_millis()
                )))
            }
        };

        debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            bytes = body.len(),
            "Backend responded"
        );

        classify_response(status, &body)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map a received response onto the three-way classification.
pub(crate) fn classify_response(
    status: StatusCode,
    body: &[u8],
) -> Result<BackendResponse, BackendError> {
    let parsed = serde_json::from_slice::<Value>(body);

    if !status.is_success() {
        return Err(BackendError::Rejected {
            status,
            body: parsed.unwrap_or(Value::Null),
        });
    }

    parsed
        .map(|body| BackendResponse::new(status, body))
        .map_err(|e| BackendError::Malformed {
            status,
            message: e.to_string(),
        })
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}
