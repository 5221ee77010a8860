//! Edge gate: redirects unauthenticated page requests to the login screen.
//!
//! This layer checks only that the access-token cookie EXISTS. It never
//! decodes or validates the token; an expired-but-present cookie passes and
//! is caught downstream when the platform API answers 401. The gate never
//! fails a request: every path either passes through or redirects.

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{cookies, AuthMessage};

/// Pages reachable without a session.
const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/signup",
    "/forgot-password",
    "/reset-password",
    "/health",
];

/// Prefixes that are never gated: API routes carry their own auth semantics
/// (401, not redirect), and static assets must load on the login page itself.
const PUBLIC_PREFIXES: &[&str] = &["/api/", "/assets/", "/favicon.ico"];

pub async fn auth_gate(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !requires_auth(&path) {
        return next.run(request).await;
    }

    let has_session_cookie = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|header| cookies::extract_cookie(header, cookies::ACCESS_TOKEN).is_some())
        .unwrap_or(false);

    if has_session_cookie {
        next.run(request).await
    } else {
        Redirect::temporary(&login_redirect(&path)).into_response()
    }
}

/// Whether a path is gated on cookie presence.
pub fn requires_auth(path: &str) -> bool {
    if PUBLIC_PATHS.contains(&path) {
        return false;
    }
    !PUBLIC_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Builds the login redirect target, carrying why the caller was bounced and
/// where to return after signing in.
pub fn login_redirect(original_path: &str) -> String {
    format!(
        "/login?message={}&redirect={}",
        AuthMessage::AuthRequired,
        encode_query_component(original_path)
    )
}

/// Percent-encodes a query component. `/` stays literal so redirect targets
/// remain readable, matching what browsers accept in query values.
fn encode_query_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_pages_are_not_gated() {
        assert!(!requires_auth("/"));
        assert!(!requires_auth("/login"));
        assert!(!requires_auth("/signup"));
        assert!(!requires_auth("/health"));
    }

    #[test]
    fn test_api_and_asset_prefixes_are_not_gated() {
        assert!(!requires_auth("/api/auth/refresh"));
        assert!(!requires_auth("/api/v1/jobs"));
        assert!(!requires_auth("/assets/app.css"));
        assert!(!requires_auth("/favicon.ico"));
    }

    #[test]
    fn test_app_pages_are_gated() {
        assert!(requires_auth("/dashboard"));
        assert!(requires_auth("/jobs/123"));
        assert!(requires_auth("/settings/profile"));
        // prefix match must not leak onto sibling paths
        assert!(requires_auth("/apidocs"));
    }

    #[test]
    fn test_login_redirect_carries_message_and_path() {
        assert_eq!(
            login_redirect("/dashboard"),
            "/login?message=auth_required&redirect=/dashboard"
        );
    }

    #[test]
    fn test_login_redirect_encodes_reserved_characters() {
        assert_eq!(
            login_redirect("/jobs?tab=saved&page=2"),
            "/login?message=auth_required&redirect=/jobs%3Ftab%3Dsaved%26page%3D2"
        );
    }
}
