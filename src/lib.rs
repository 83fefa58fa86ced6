//! # MedPortal Gateway
//!
//! Session-authorization gateway for the MedPortal clinical portal.
//!
//! The gateway sits between the portal's browser client and the backend
//! model/record service. It owns no data: every route makes at most one
//! backend call and either passes the answer through or degrades to a
//! well-defined fallback.
//!
//! ## Features
//!
//! - **Session issuer**: exchanges doctor credentials for a role cookie
//! - **Session gate**: admin-only area guarded by the role cookie, with
//!   optional HMAC-signed cookie values
//! - **Resource proxy**: doctor and hospital CRUD with credential forwarding
//! - **Prediction proxy**: resistance predictions with a placeholder fallback
//!   when the model is down
//! - **Bounded backend calls**: one attempt per call, explicit deadline,
//!   three-way outcome classification
//!
//! ## Architecture
//!
//! - [`backend`] - Backend client trait, HTTP implementation, credential forwarding
//! - [`session`] - Roles, session cookie parsing and signing
//! - [`predict`] - Prediction normalization and placeholder predictor
//! - [`server`] - Axum router, session gate and route handlers
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use medportal_gateway::{create_router, HttpBackend, RouterConfig, DEFAULT_BACKEND_TIMEOUT};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = HttpBackend::new("http://127.0.0.1:8000", DEFAULT_BACKEND_TIMEOUT)
//!         .expect("valid backend URL");
//!     let router = create_router(backend, RouterConfig::new().with_session_secret("s3cret"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod predict;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use backend::{
    Backend, BackendRequest, BackendResponse, ForwardedHeaders, HttpBackend,
    DEFAULT_BACKEND_TIMEOUT, DEFAULT_BACKEND_URL,
};
pub use config::{Config, DemoCredentials};
pub use error::{BackendError, ClientError, ProxyError, SessionError};
pub use predict::{normalize, MockPredictor, Prediction, PredictionSource};
pub use server::{
    create_router, health_handler, AppState, ErrorResponse, HealthResponse, LoginError,
    RouterConfig,
};
pub use session::{Role, SessionCodec, SessionSigner, SESSION_COOKIE};
