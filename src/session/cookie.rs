//! Cookie header parsing and `Set-Cookie` construction.
//!
//! This is the single place the gateway reads or writes cookies.

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Uri};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "user_role";

/// Session lifetime in seconds (24 hours).
pub const SESSION_MAX_AGE: u64 = 24 * 60 * 60;

/// Find the value of cookie `name` across every `Cookie` header.
///
/// The first occurrence wins. Values are returned percent-decoded with any
/// surrounding double quotes removed.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| {
            let value = value.trim().trim_matches('"');
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

/// Whether the inbound request arrived over HTTPS.
///
/// Honors `X-Forwarded-Proto` from a terminating proxy.
pub fn is_secure_request(headers: &HeaderMap, uri: &Uri) -> bool {
    if uri.scheme_str() == Some("https") {
        return true;
    }
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|proto| proto.trim().eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// Build the `Set-Cookie` value that installs a session.
pub fn session_cookie(value: &str, secure: bool) -> HeaderValue {
    build_cookie(&urlencoding::encode(value), SESSION_MAX_AGE, secure)
}

/// Build the `Set-Cookie` value that destroys the session.
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    build_cookie("", 0, secure)
}

/// Append a `Set-Cookie` header.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: HeaderValue) {
    headers.append(SET_COOKIE, cookie);
}

fn build_cookie(encoded_value: &str, max_age: u64, secure: bool) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, encoded_value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    // Percent-encoded values are visible ASCII, so this only falls back on a bug.
    HeaderValue::from_str(&cookie)
        .unwrap_or_else(|_| HeaderValue::from_static("user_role=; Path=/; Max-Age=0"))
}
