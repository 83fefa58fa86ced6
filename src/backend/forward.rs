//! Credential forwarding from inbound requests to backend calls.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue};

/// Headers propagated from the browser request to the backend.
///
/// Only `Authorization` and `Cookie` are carried over; `Content-Type` is
/// always `application/json` on the outbound side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedHeaders {
    authorization: Option<HeaderValue>,
    cookie: Option<HeaderValue>,
}

impl ForwardedHeaders {
    /// Extract the forwardable headers. Missing headers are simply omitted.
    ///
    /// Multiple `Cookie` headers (as produced by HTTP/2 clients) are joined
    /// into one with `"; "`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let authorization = headers.get(AUTHORIZATION).cloned();

        let cookies: Vec<&str> = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .collect();
        let cookie = match cookies.len() {
            0 => None,
            1 => headers.get(COOKIE).cloned(),
            _ => HeaderValue::from_str(&cookies.join("; ")).ok(),
        };

        Self {
            authorization,
            cookie,
        }
    }

    pub fn authorization(&self) -> Option<&HeaderValue> {
        self.authorization.as_ref()
    }

    pub fn cookie(&self) -> Option<&HeaderValue> {
        self.cookie.as_ref()
    }

    /// Build the outbound header map.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(value) = &self.authorization {
            headers.insert(AUTHORIZATION, value.clone());
        }
        if let Some(value) = &self.cookie {
            headers.insert(COOKIE, value.clone());
        }
        headers
    }
}

impl<S> FromRequestParts<S> for ForwardedHeaders
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ForwardedHeaders::from_headers(&parts.headers))
    }
}
