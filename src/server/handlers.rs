//! Shared handler types and the simple portal endpoints.
//!
//! # Endpoints
//!
//! - `GET /` - Entry route (the session gate clears the cookie here)
//! - `GET /health` - Health check endpoint
//! - `GET /dashboard-stats` - Prediction statistics, zeroed when the backend is down

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use crate::backend::{Backend, BackendRequest, ForwardedHeaders};
use crate::config::DemoCredentials;
use crate::error::{BackendError, ProxyError};
use crate::predict::MockPredictor;
use crate::session::SessionCodec;

/// Header reporting whether dashboard stats are live or a fallback.
pub const DASHBOARD_SOURCE_HEADER: &str = "x-dashboard-source";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// Immutable after startup; every request sees the same configuration and
/// backend client.
pub struct AppState<B: Backend> {
    /// Client for the backend model/record service
    pub backend: Arc<B>,

    /// Session cookie encoding (plain or signed)
    pub sessions: SessionCodec,

    /// Demo credentials, present only when the demo fallback is enabled
    pub demo: Option<DemoCredentials>,

    /// Placeholder predictor used when the model backend fails
    pub predictor: MockPredictor,
}

impl<B: Backend> AppState<B> {
    /// Create state with plain session cookies and no demo fallback.
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            sessions: SessionCodec::plain(),
            demo: None,
            predictor: MockPredictor::new(),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionCodec) -> Self {
        self.sessions = sessions;
        self
    }

    /// Enable the demo login fallback for `credentials`.
    pub fn with_demo_fallback(mut self, credentials: DemoCredentials) -> Self {
        self.demo = Some(credentials);
        self
    }

    /// Whether the submitted credentials should get the demo session.
    pub fn is_demo_login(&self, doctor_id: &str, password: &str) -> bool {
        self.demo
            .as_ref()
            .map(|demo| demo.matches(doctor_id, password))
            .unwrap_or(false)
    }
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            sessions: self.sessions.clone(),
            demo: self.demo.clone(),
            predictor: self.predictor,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Error type identifier (e.g., "invalid_request", "backend_unavailable")
    pub code: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        code: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Response for the entry route.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub authenticated: bool,
    pub login: String,
}

/// Dashboard statistics, as produced by the backend.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub checks_this_week: u64,
    pub resistant_count: u64,
    pub not_resistant_count: u64,
    pub top_antibiotics: Vec<AntibioticCount>,
    pub average_age: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AntibioticCount {
    pub name: String,
    pub count: u64,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ProxyError to HTTP response.
///
/// Backend rejections keep the backend's status and body. Server-class
/// failures are logged at ERROR, client-class at DEBUG.
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ProxyError::Upstream { status, body } => {
                debug!(status = status.as_u16(), "Passing backend rejection through");
                if body.is_null() {
                    let message = format!("Backend returned {}", status.as_u16());
                    let response = ErrorResponse::with_status("backend_error", message, status);
                    return (status, Json(response)).into_response();
                }
                return (status, Json(body)).into_response();
            }
            ProxyError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "invalid_request", message)
            }
            ProxyError::Unavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable", message)
            }
            ProxyError::Failed { operation, source } => {
                error!(error = %source, "{}", operation);
                (StatusCode::INTERNAL_SERVER_ERROR, "backend_failure", operation)
            }
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Body Parsing
// =============================================================================

/// Parse a request body as a JSON object.
///
/// Handlers take raw bytes so a malformed body still gets a JSON error
/// response rather than the framework's plain-text rejection.
pub fn parse_json_object(body: &Bytes) -> Result<Map<String, Value>, ProxyError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ProxyError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(ProxyError::BadRequest(format!("Invalid JSON body: {}", e))),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint. Does not contact the backend.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Entry route. Reaching it means the session has been cleared.
pub async fn entry_handler() -> Json<EntryResponse> {
    Json(EntryResponse {
        authenticated: false,
        login: "/login".to_string(),
    })
}

/// Fallback for unknown paths.
pub async fn not_found_handler() -> Response {
    let response = ErrorResponse::with_status("not_found", "Not found", StatusCode::NOT_FOUND);
    (StatusCode::NOT_FOUND, Json(response)).into_response()
}

/// Forward `GET /dashboard-stats`.
///
/// # Response
///
/// The backend's statistics, or its rejection passed through. When the
/// backend is unreachable or answers with a malformed body, `200 OK` with
/// all-zero statistics and `X-Dashboard-Source: fallback`.
pub async fn dashboard_stats_handler<B: Backend>(
    State(state): State<AppState<B>>,
    credentials: ForwardedHeaders,
) -> Result<Response, ProxyError> {
    let request = BackendRequest::get("dashboard-stats").with_headers(credentials);

    match state.backend.send(request).await {
        Ok(response) => Ok((response.status, Json(response.body)).into_response()),
        Err(BackendError::Rejected { status, body }) => Err(ProxyError::Upstream { status, body }),
        Err(err) => {
            warn!(error = %err, "Dashboard stats unavailable, serving empty statistics");
            let mut response = Json(DashboardStats::default()).into_response();
            response
                .headers_mut()
                .insert(DASHBOARD_SOURCE_HEADER, HeaderValue::from_static("fallback"));
            Ok(response)
        }
    }
}

/// Zeroed statistics as JSON, for comparison in tests and docs.
pub fn empty_dashboard_stats() -> Value {
    json!({
        "checks_this_week": 0,
        "resistant_count": 0,
        "not_resistant_count": 0,
        "top_antibiotics": [],
        "average_age": 0.0,
    })
}

// =============================================================================
// Tests
// =============================================================================
