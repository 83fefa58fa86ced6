use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Outcome of a failed backend call.
///
/// Every handler consumes this three-way classification to decide between
/// passing the backend's answer through and degrading to a fallback.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Transport-level failure: connection refused, reset, DNS failure or
    /// the call deadline elapsed. No HTTP response was obtained.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a non-2xx status.
    ///
    /// `body` holds the parsed JSON body, or `Value::Null` when the body was
    /// empty or not JSON.
    #[error("Backend rejected request with status {status}")]
    Rejected { status: StatusCode, body: Value },

    /// The backend answered 2xx but the body was not valid JSON.
    #[error("Backend returned a malformed body (status {status}): {message}")]
    Malformed { status: StatusCode, message: String },
}

impl BackendError {
    /// True for transport failures (including an elapsed deadline).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }

    /// HTTP status reported by the backend, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BackendError::Unavailable(_) => None,
            BackendError::Rejected { status, .. } | BackendError::Malformed { status, .. } => {
                Some(*status)
            }
        }
    }
}

/// Errors raised while constructing the backend client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base address is not an absolute http(s) URL
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reasons a session cookie value is refused by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Signing is enabled but the value carries no signature
    #[error("Session cookie is not signed")]
    MissingSignature,

    /// Signature segment is not valid hex
    #[error("Session cookie signature is not valid hex")]
    InvalidSignatureFormat,

    /// Signature does not match the role
    #[error("Session cookie signature mismatch")]
    InvalidSignature,
}

/// Errors produced by the admin resource proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required discriminator or identifier is missing from the request
    #[error("{0}")]
    BadRequest(String),

    /// The backend answered with a non-2xx status; passed through verbatim
    #[error("Backend returned {status}")]
    Upstream { status: StatusCode, body: Value },

    /// The backend could not be reached and the route has no fallback
    #[error("{0}")]
    Unavailable(String),

    /// Transport or parsing failure; `operation` is the user-facing message
    #[error("{operation}")]
    Failed {
        operation: String,
        #[source]
        source: BackendError,
    },
}

impl ProxyError {
    /// Classify a backend error for the operation named by `operation`.
    ///
    /// Rejections are passed through; everything else becomes a stable 500.
    pub fn from_backend(operation: impl Into<String>, err: BackendError) -> Self {
        match err {
            BackendError::Rejected { status, body } => ProxyError::Upstream { status, body },
            other => ProxyError::Failed {
                operation: operation.into(),
                source: other,
            },
        }
    }
}
