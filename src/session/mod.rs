//! Portal session credential.
//!
//! The session is a single cookie, `user_role`, whose value is the role the
//! backend granted at login. The gateway keeps no session state of its own.
//!
//! When a session secret is configured the value is signed
//! (`{role}.{hmac}`), so a browser cannot mint an `Admin` session by editing
//! the cookie. Without a secret the bare role is stored.
//!
//! # Example
//!
//! ```rust
//! use medportal_gateway::session::{Role, SessionCodec};
//!
//! let codec = SessionCodec::signed("secret");
//! let value = codec.encode(&Role::Admin);
//! assert_eq!(codec.decode(&value), Some(Role::Admin));
//! assert_eq!(codec.decode("Admin"), None);
//! ```

mod cookie;
mod signer;

use std::fmt;

use http::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SessionError;

pub use cookie::{
    append_set_cookie, clear_session_cookie, is_secure_request, read_cookie, session_cookie,
    SESSION_COOKIE, SESSION_MAX_AGE,
};
pub use signer::SessionSigner;

// =============================================================================
// Role
// =============================================================================

/// Role carried by a session. Comparison with the well-known roles is
/// case-insensitive; other backend-supplied roles are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Doctor,
    Other(String),
}

impl Role {
    /// Normalize a role string: `admin` → `Admin`, `doctor` → `Doctor`.
    /// Blank input yields `Doctor`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else if trimmed.eq_ignore_ascii_case("doctor") || trimmed.is_empty() {
            Role::Doctor
        } else {
            Role::Other(trimmed.to_string())
        }
    }

    /// Role from a backend login payload; missing or non-string means `Doctor`.
    pub fn from_backend(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .map(Role::parse)
            .unwrap_or(Role::Doctor)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::Doctor => "Doctor",
            Role::Other(role) => role,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Session Codec
// =============================================================================

/// Encodes roles into cookie values and back.
#[derive(Debug, Clone, Default)]
pub struct SessionCodec {
    signer: Option<SessionSigner>,
}

impl SessionCodec {
    /// Bare role values, no signature.
    pub fn plain() -> Self {
        Self { signer: None }
    }

    /// HMAC-signed role values.
    pub fn signed(secret: impl AsRef<[u8]>) -> Self {
        Self {
            signer: Some(SessionSigner::new(secret)),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    /// Cookie value for `role`.
    pub fn encode(&self, role: &Role) -> String {
        match &self.signer {
            Some(signer) => signer.sign(role.as_str()),
            None => role.as_str().to_string(),
        }
    }

    /// Role from a cookie value, or `None` when empty or not trustworthy.
    pub fn decode(&self, value: &str) -> Option<Role> {
        self.try_decode(value)
            .map_err(|err| match err {
                SessionError::InvalidSignature => warn!("Rejected session cookie: {}", err),
                _ => debug!("Rejected session cookie: {}", err),
            })
            .ok()
            .flatten()
    }

    fn try_decode(&self, value: &str) -> Result<Option<Role>, SessionError> {
        let role = match &self.signer {
            Some(signer) => signer.verify(value)?,
            None => value,
        };
        if role.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Role::parse(role)))
    }

    /// Session role of an inbound request.
    pub fn role_from_headers(&self, headers: &HeaderMap) -> Option<Role> {
        read_cookie(headers, SESSION_COOKIE).and_then(|value| self.decode(&value))
    }

    /// `Set-Cookie` value installing a session for `role`.
    pub fn issue(&self, role: &Role, secure: bool) -> HeaderValue {
        session_cookie(&self.encode(role), secure)
    }
}
