//! Configuration management for the MedPortal gateway.
//!
//! Configuration is resolved once at startup and passed explicitly into the
//! router and backend client. It supports:
//! - Command-line arguments via clap
//! - Environment variables with `MEDPORTAL_` prefix
//! - The backend base address from `BACKEND_URL`
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `MEDPORTAL_HOST` - Server bind address (default: 0.0.0.0)
//! - `MEDPORTAL_PORT` - Server port (default: 3000)
//! - `BACKEND_URL` - Backend base address (default: http://127.0.0.1:8000)
//! - `MEDPORTAL_BACKEND_TIMEOUT` - Backend call deadline in seconds (default: 10)
//! - `MEDPORTAL_ALLOW_DEMO_FALLBACK` - Enable the demo login escape hatch (default: false)
//! - `MEDPORTAL_DEMO_DOCTOR_ID` / `MEDPORTAL_DEMO_PASSWORD` - Demo credentials
//! - `MEDPORTAL_SESSION_SECRET` - HMAC secret for signed session cookies
//! - `MEDPORTAL_CORS_ORIGINS` - Allowed CORS origins (comma-separated)

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::backend::DEFAULT_BACKEND_URL;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default backend call deadline in seconds.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLI Arguments
// =============================================================================

/// MedPortal gateway - session authorization and backend proxy.
///
/// Sits between the portal's browser client and the prediction/record
/// backend. Issues role cookies, gates admin routes and forwards requests.
#[derive(Parser, Debug, Clone)]
#[command(name = "medportal-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MEDPORTAL_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MEDPORTAL_PORT")]
    pub port: u16,

    // =========================================================================
    // Backend Configuration
    // =========================================================================
    /// Base address of the backend model/record service.
    #[arg(long, default_value = DEFAULT_BACKEND_URL, env = "BACKEND_URL")]
    pub backend_url: String,

    /// Deadline for a single backend call, in seconds.
    ///
    /// A call that exceeds it is treated like an unreachable backend.
    #[arg(long, default_value_t = DEFAULT_BACKEND_TIMEOUT_SECS, env = "MEDPORTAL_BACKEND_TIMEOUT")]
    pub backend_timeout: u64,

    // =========================================================================
    // Session Configuration
    // =========================================================================
    /// Secret key for HMAC-signed session cookies.
    ///
    /// When absent the cookie carries the bare role string.
    #[arg(long, env = "MEDPORTAL_SESSION_SECRET")]
    pub session_secret: Option<String>,

    /// Accept the demo credentials when the backend rejects or cannot be reached.
    ///
    /// WARNING: development only. Grants a Doctor session without real auth.
    #[arg(long, default_value_t = false, env = "MEDPORTAL_ALLOW_DEMO_FALLBACK")]
    pub allow_demo_fallback: bool,

    /// Doctor ID accepted by the demo fallback.
    #[arg(long, env = "MEDPORTAL_DEMO_DOCTOR_ID")]
    pub demo_doctor_id: Option<String>,

    /// Password accepted by the demo fallback.
    #[arg(long, env = "MEDPORTAL_DEMO_PASSWORD")]
    pub demo_password: Option<String>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "MEDPORTAL_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

/// Credentials accepted by the demo login fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCredentials {
    pub doctor_id: String,
    pub password: String,
}

impl DemoCredentials {
    pub fn new(doctor_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            password: password.into(),
        }
    }

    pub fn matches(&self, doctor_id: &str, password: &str) -> bool {
        self.doctor_id == doctor_id && self.password == password
    }
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match Url::parse(&self.backend_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(format!(
                    "Backend URL must use http or https, got '{}'. Set --backend-url or BACKEND_URL",
                    url.scheme()
                ))
            }
            Err(e) => {
                return Err(format!(
                    "Invalid backend URL '{}': {}. Set --backend-url or BACKEND_URL",
                    self.backend_url, e
                ))
            }
        }

        if self.backend_timeout == 0 {
            return Err("backend_timeout must be greater than 0".to_string());
        }

        if self.allow_demo_fallback && self.demo_credentials().is_none() {
            return Err(
                "Demo fallback is enabled but no demo credentials provided. \
                 Set --demo-doctor-id and --demo-password, or disable --allow-demo-fallback"
                    .to_string(),
            );
        }

        if let Some(secret) = &self.session_secret {
            if secret.is_empty() {
                return Err("session_secret must not be empty when provided".to_string());
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Backend call deadline.
    pub fn backend_deadline(&self) -> Duration {
        Duration::from_secs(self.backend_timeout)
    }

    /// Demo credentials, if both halves are configured and non-empty.
    pub fn demo_credentials(&self) -> Option<DemoCredentials> {
        match (&self.demo_doctor_id, &self.demo_password) {
            (Some(id), Some(password)) if !id.is_empty() && !password.is_empty() => {
                Some(DemoCredentials::new(id.clone(), password.clone()))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
