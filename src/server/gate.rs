//! Session gate middleware.
//!
//! Runs before routing and decides from the request path and the
//! `user_role` cookie alone:
//!
//! - `/` logs the visitor out: the request proceeds and the response gets a
//!   clearing `Set-Cookie`.
//! - `/admin` and everything under `/admin/` require an `Admin` session;
//!   anything else is redirected to `/` with `307 Temporary Redirect`.
//! - All other paths pass through untouched.
//!
//! The gate never produces an error response.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderMap;
use tracing::debug;

use crate::session::{append_set_cookie, clear_session_cookie, is_secure_request, SessionCodec};

/// Entry route; visiting it clears the session.
pub const ENTRY_PATH: &str = "/";

/// Prefix of the admin-only area.
pub const ADMIN_PATH: &str = "/admin";

/// What the gate does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Run the request, then clear the session cookie on the response
    ClearAndContinue,

    /// Send the browser back to the entry route
    Redirect,

    /// Run the request unchanged
    Continue,
}

/// Whether `path` belongs to the admin area (`/admin` or `/admin/...`).
pub fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PATH
        || path
            .strip_prefix(ADMIN_PATH)
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
}

/// Decide what to do with a request for `path` carrying `headers`.
pub fn decide(sessions: &SessionCodec, path: &str, headers: &HeaderMap) -> GateDecision {
    if path == ENTRY_PATH {
        return GateDecision::ClearAndContinue;
    }

    if is_admin_path(path) {
        let role = sessions.role_from_headers(headers);
        if role.as_ref().map(|r| r.is_admin()).unwrap_or(false) {
            return GateDecision::Continue;
        }
        debug!(
            path = path,
            role = role.as_ref().map(|r| r.as_str()).unwrap_or("none"),
            "Redirecting non-admin session away from admin area"
        );
        return GateDecision::Redirect;
    }

    GateDecision::Continue
}

/// Axum middleware applying [`decide`].
///
/// # Example
///
/// ```ignore
/// use axum::{middleware, Router};
/// use medportal_gateway::server::gate::session_gate;
/// use medportal_gateway::session::SessionCodec;
///
/// let app = Router::new()
///     .route("/admin", get(admin_list_handler))
///     .layer(middleware::from_fn_with_state(SessionCodec::plain(), session_gate));
/// ```
pub async fn session_gate(
    State(sessions): State<SessionCodec>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match decide(&sessions, &path, request.headers()) {
        GateDecision::Continue => next.run(request).await,
        GateDecision::Redirect => Redirect::temporary(ENTRY_PATH).into_response(),
        GateDecision::ClearAndContinue => {
            let secure = is_secure_request(request.headers(), request.uri());
            let mut response = next.run(request).await;
            append_set_cookie(response.headers_mut(), clear_session_cookie(secure));
            response
        }
    }
}
