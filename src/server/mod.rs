//! HTTP server layer for the MedPortal gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │    gate     │  │   routes    │  │        handlers         │  │
//! │  │ (role check)│  │(router cfg) │  │ login/admin/predict/... │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └──────────────────────────────┬──────────────────────────────────┘
//!                                │
//!                                ▼
//!                     backend::Backend (one call)
//! ```

pub mod admin;
pub mod gate;
pub mod handlers;
pub mod login;
pub mod predict;
pub mod routes;

pub use admin::{
    admin_create_handler, admin_delete_handler, admin_list_handler, admin_update_handler,
    normalize_doctor_ids, AdminQueryParams, ResourceKind,
};
pub use gate::{decide, is_admin_path, session_gate, GateDecision};
pub use handlers::{
    dashboard_stats_handler, empty_dashboard_stats, entry_handler, health_handler, AppState,
    DashboardStats, ErrorResponse, HealthResponse, DASHBOARD_SOURCE_HEADER,
};
pub use login::{
    login_handler, refresh_handler, rejection_message, validate_session_handler, LoginError,
    LoginRequest, LoginResponse,
};
pub use predict::{predict_handler, PREDICTION_SOURCE_HEADER};
pub use routes::{create_router, RouterConfig};
