//! Login and token refresh.
//!
//! `POST /login` exchanges a doctor ID and password for a backend session and
//! installs the `user_role` cookie. `POST /token/refresh` and
//! `POST /session/validate` forward a token to the backend unchanged.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::handlers::{parse_json_object, AppState};
use crate::backend::{Backend, BackendRequest, ForwardedHeaders};
use crate::error::{BackendError, ProxyError};
use crate::session::{is_secure_request, Role};

/// Message returned for a backend `422`.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input. Doctor ID must be 6 digits.";

/// Message returned when the backend rejection carries no usable detail.
pub const INCORRECT_CREDENTIALS_MESSAGE: &str = "Incorrect ID or password.";

// =============================================================================
// Errors
// =============================================================================

/// Login failures. Every variant renders as `{success: false, error}`.
#[derive(Debug, Error)]
pub enum LoginError {
    /// `doctor_id` or `password` missing from the request
    #[error("Missing required field: {0}")]
    MissingCredentials(&'static str),

    /// Request body is not a JSON object
    #[error("Invalid request body")]
    InvalidBody,

    /// Backend refused the credentials; keeps the backend status
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// Backend could not be reached
    #[error("Login service unavailable.")]
    Unavailable,

    /// Any other failure
    #[error("Authentication failed")]
    Internal,
}

impl LoginError {
    pub fn status(&self) -> StatusCode {
        match self {
            LoginError::MissingCredentials(_) | LoginError::InvalidBody => StatusCode::BAD_REQUEST,
            LoginError::Rejected { status, .. } => *status,
            LoginError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            LoginError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Request / Response
// =============================================================================

/// Credentials submitted to `POST /login`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub doctor_id: String,

    /// Forwarded exactly as submitted, `null` included
    pub password: Value,
}

impl LoginRequest {
    /// Extract credentials from a JSON body.
    ///
    /// `doctor_id` must be a non-empty string or a number. `password` only has
    /// to be present; its value, empty or `null`, is left to the backend.
    pub fn from_body(body: &Bytes) -> Result<Self, LoginError> {
        let mut map = parse_json_object(body).map_err(|_| LoginError::InvalidBody)?;

        let doctor_id = match map.get("doctor_id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(LoginError::MissingCredentials("doctor_id")),
        };

        let password = map
            .remove("password")
            .ok_or(LoginError::MissingCredentials("password"))?;

        Ok(Self {
            doctor_id,
            password,
        })
    }

    /// Password as text, when it was submitted as a string.
    pub fn password_str(&self) -> Option<&str> {
        self.password.as_str()
    }

    fn to_backend_body(&self) -> Value {
        json!({
            "doctor_id": self.doctor_id,
            "password": self.password,
        })
    }
}

/// Successful login body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: String,
    pub access_token: Value,
    pub refresh_token: Value,
    pub token_type: Value,
    pub expires_in: Value,
}

impl LoginResponse {
    /// Success body built from the backend's login answer.
    pub fn from_backend(role: &Role, body: &Value) -> Self {
        let field = |name: &str| body.get(name).cloned().unwrap_or(Value::Null);
        Self {
            success: true,
            role: role.to_string(),
            access_token: field("access_token"),
            refresh_token: field("refresh_token"),
            token_type: field("token_type"),
            expires_in: field("expires_in"),
        }
    }

    /// Success body for a demo session, which has no backend tokens.
    pub fn demo() -> Self {
        Self::from_backend(&Role::Doctor, &Value::Null)
    }
}

/// User-facing message for a backend login rejection.
pub fn rejection_message(status: StatusCode, body: &Value) -> String {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return INVALID_INPUT_MESSAGE.to_string();
    }

    match body.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                INCORRECT_CREDENTIALS_MESSAGE.to_string()
            } else {
                messages.join("; ")
            }
        }
        _ => INCORRECT_CREDENTIALS_MESSAGE.to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle `POST /login`.
///
/// The session cookie is set only on success: a backend-granted session, or
/// the demo session when the fallback is enabled and the demo pair was
/// submitted.
pub async fn login_handler<B: Backend>(
    State(state): State<AppState<B>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, LoginError> {
    let credentials = LoginRequest::from_body(&body)?;
    let secure = is_secure_request(&headers, &uri);

    let request = BackendRequest::post("login", credentials.to_backend_body())
        .with_headers(ForwardedHeaders::from_headers(&headers));

    match state.backend.send(request).await {
        Ok(response) => {
            let role = Role::from_backend(response.body.get("role"));
            info!(doctor_id = %credentials.doctor_id, role = %role, "Login succeeded");
            let cookie = state.sessions.issue(&role, secure);
            let body = LoginResponse::from_backend(&role, &response.body);
            Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(body)).into_response())
        }
        Err(err @ (BackendError::Rejected { .. } | BackendError::Unavailable(_)))
            if credentials
                .password_str()
                .is_some_and(|password| state.is_demo_login(&credentials.doctor_id, password)) =>
        {
            warn!(error = %err, "Backend login failed, granting demo session");
            let cookie = state.sessions.issue(&Role::Doctor, secure);
            Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(LoginResponse::demo())).into_response())
        }
        Err(BackendError::Rejected { status, body }) => {
            let message = rejection_message(status, &body);
            debug!(status = status.as_u16(), "Login rejected: {}", message);
            Err(LoginError::Rejected { status, message })
        }
        Err(BackendError::Unavailable(reason)) => {
            error!(reason = %reason, "Login service unavailable");
            Err(LoginError::Unavailable)
        }
        Err(err) => {
            error!(error = %err, "Login failed");
            Err(LoginError::Internal)
        }
    }
}

/// Handle `POST /token/refresh`.
///
/// Requires `refresh_token` in the body; the backend's answer is passed
/// through, and an unreachable backend yields `503`.
pub async fn refresh_handler<B: Backend>(
    State(state): State<AppState<B>>,
    credentials: ForwardedHeaders,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let map = parse_json_object(&body)?;
    let refresh_token = match map.get("refresh_token") {
        Some(token) if !token.is_null() => token.clone(),
        _ => {
            return Err(ProxyError::BadRequest(
                "Missing required field: refresh_token".to_string(),
            ))
        }
    };

    let request = BackendRequest::post("token/refresh", json!({ "refresh_token": refresh_token }))
        .with_headers(credentials);

    match state.backend.send(request).await {
        Ok(response) => Ok((response.status, Json(response.body)).into_response()),
        Err(BackendError::Unavailable(reason)) => {
            error!(reason = %reason, "Token service unavailable");
            Err(ProxyError::Unavailable("Token service unavailable.".to_string()))
        }
        Err(err) => Err(ProxyError::from_backend("Token refresh failed", err)),
    }
}

/// Handle `POST /session/validate`.
///
/// Requires `token` in the body. The backend reads it from the query string,
/// so it is forwarded there; the answer is passed through.
pub async fn validate_session_handler<B: Backend>(
    State(state): State<AppState<B>>,
    credentials: ForwardedHeaders,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let map = parse_json_object(&body)?;
    let token = match map.get("token") {
        Some(Value::String(token)) if !token.is_empty() => token.clone(),
        _ => {
            return Err(ProxyError::BadRequest(
                "Missing required field: token".to_string(),
            ))
        }
    };

    let request =
        BackendRequest::new(Method::POST, validate_path(&token)).with_headers(credentials);

    match state.backend.send(request).await {
        Ok(response) => Ok((response.status, Json(response.body)).into_response()),
        Err(BackendError::Unavailable(reason)) => {
            error!(reason = %reason, "Session service unavailable");
            Err(ProxyError::Unavailable("Session service unavailable.".to_string()))
        }
        Err(err) => Err(ProxyError::from_backend("Session validation failed", err)),
    }
}

fn validate_path(token: &str) -> String {
    format!("session/validate?token={}", urlencoding::encode(token))
}
