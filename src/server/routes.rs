//! Router configuration for the MedPortal gateway.
//!
//! This module defines the HTTP routes and applies the session gate, CORS
//! and tracing middleware.
//!
//! # Route Structure
//!
//! ```text
//! /                  - Entry route, clears the session (public)
//! /health            - Health check (public)
//! /login             - Session issuer (public)
//! /token/refresh     - Token refresh proxy (public)
//! /session/validate  - Access token validation proxy (public)
//! /admin             - Doctor/hospital CRUD proxy (Admin session)
//! /predict           - Prediction proxy with placeholder fallback (public)
//! /dashboard-stats   - Statistics proxy with zeroed fallback (public)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use medportal_gateway::backend::{HttpBackend, DEFAULT_BACKEND_TIMEOUT};
//! use medportal_gateway::server::{create_router, RouterConfig};
//!
//! let backend = HttpBackend::new("http://127.0.0.1:8000", DEFAULT_BACKEND_TIMEOUT)?;
//! let config = RouterConfig::new()
//!     .with_session_secret("my-secret-key")
//!     .with_cors_origins(vec!["https://portal.example.com".to_string()]);
//!
//! let router = create_router(backend, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::admin::{
    admin_create_handler, admin_delete_handler, admin_list_handler, admin_update_handler,
};
use super::gate::session_gate;
use super::handlers::{
    dashboard_stats_handler, entry_handler, health_handler, not_found_handler, AppState,
};
use super::login::{login_handler, refresh_handler, validate_session_handler};
use super::predict::predict_handler;
use crate::backend::Backend;
use crate::config::DemoCredentials;
use crate::session::SessionCodec;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Secret for signing session cookies (None = bare role values)
    pub session_secret: Option<String>,

    /// Demo credentials accepted when the backend login fails (None = disabled)
    pub demo_fallback: Option<DemoCredentials>,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - Session cookies are unsigned
    /// - The demo login fallback is disabled
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            session_secret: None,
            demo_fallback: None,
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Sign session cookies with `secret`.
    pub fn with_session_secret(mut self, secret: impl Into<String>) -> Self {
        self.session_secret = Some(secret.into());
        self
    }

    /// Accept `credentials` as a demo login when the backend fails.
    ///
    /// **Warning**: This should only be used for development.
    pub fn with_demo_fallback(mut self, credentials: DemoCredentials) -> Self {
        self.demo_fallback = Some(credentials);
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    fn session_codec(&self) -> SessionCodec {
        match &self.session_secret {
            Some(secret) => SessionCodec::signed(secret),
            None => SessionCodec::plain(),
        }
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The session gate wraps every route, including the fallback, so it sees
/// `/` and `/admin/...` paths regardless of whether a handler matches.
pub fn create_router<B>(backend: B, config: RouterConfig) -> Router
where
    B: Backend + 'static,
{
    let sessions = config.session_codec();

    let mut app_state = AppState::new(backend).with_sessions(sessions.clone());
    if let Some(demo) = config.demo_fallback.clone() {
        app_state = app_state.with_demo_fallback(demo);
    }

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(entry_handler))
        .route("/health", get(health_handler))
        .route("/login", post(login_handler::<B>))
        .route("/token/refresh", post(refresh_handler::<B>))
        .route("/session/validate", post(validate_session_handler::<B>))
        .route(
            "/admin",
            get(admin_list_handler::<B>)
                .post(admin_create_handler::<B>)
                .put(admin_update_handler::<B>)
                .delete(admin_delete_handler::<B>),
        )
        .route("/predict", post(predict_handler::<B>))
        .route("/dashboard-stats", get(dashboard_stats_handler::<B>))
        .fallback(not_found_handler)
        .with_state(app_state)
        .layer(middleware::from_fn_with_state(sessions, session_gate))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
///
/// Explicit origins also allow credentials so the session cookie travels
/// with cross-origin requests.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, COOKIE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins).allow_credentials(true)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
