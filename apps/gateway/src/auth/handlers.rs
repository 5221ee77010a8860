use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::cookies;
use crate::errors::AppError;
use crate::state::AppState;
use crate::upstream::{AuthOutcome, SigninRequest, TokenSet};

/// POST /api/auth/signin
///
/// Forwards credentials upstream. On a grant, mirrors the token triple into
/// cookies and relays the upstream body and status verbatim. On a denial the
/// upstream status/body pass through untouched and no cookie changes.
pub async fn handle_signin(
    State(state): State<AppState>,
    Json(credentials): Json<SigninRequest>,
) -> Result<Response, AppError> {
    match state.upstream.signin(&credentials).await? {
        AuthOutcome::Granted {
            status,
            tokens,
            body,
        } => {
            info!("Signin granted for {}", credentials.email);
            with_session_cookies(status, body, &tokens, state.config.cookie_secure)
        }
        AuthOutcome::Denied { status, body } => Ok(relay(status, body)),
    }
}

/// POST /api/auth/refresh
///
/// Reads the refresh token cookie; a missing cookie short-circuits to 401
/// without any upstream call. A grant re-issues all three cookies; a denial
/// passes through and leaves existing cookies alone.
pub async fn handle_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let refresh_token = request_cookie(&headers, cookies::REFRESH_TOKEN)
        .ok_or(AppError::MissingRefreshToken)?;

    match state.upstream.refresh(&refresh_token).await? {
        AuthOutcome::Granted {
            status,
            tokens,
            body,
        } => with_session_cookies(status, body, &tokens, state.config.cookie_secure),
        AuthOutcome::Denied { status, body } => Ok(relay(status, body)),
    }
}

/// POST /api/auth/logout
///
/// Best-effort upstream invalidation, then unconditional local teardown.
/// From the caller's perspective logout can never fail: whatever the upstream
/// does, the cookie triple is cleared and the response is 200.
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(access_token) = request_cookie(&headers, cookies::ACCESS_TOKEN) {
        match state.upstream.logout(&access_token).await {
            Ok(status) if (200..300).contains(&status) => {
                info!("Upstream session invalidated");
            }
            Ok(status) => {
                warn!("Upstream logout returned status {status}; clearing cookies anyway");
            }
            Err(e) => {
                warn!("Upstream logout failed: {e}; clearing cookies anyway");
            }
        }
    }

    let mut response = (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response();

    for cookie in cookies::clear_cookies(state.config.cookie_secure) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    response
}

/// Relays an upstream status and body unchanged, with no cookie mutation.
fn relay(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(body)).into_response()
}

/// Relays a granted upstream response with the token triple attached as
/// Set-Cookie headers.
fn with_session_cookies(
    status: u16,
    body: Value,
    tokens: &TokenSet,
    secure: bool,
) -> Result<Response, AppError> {
    let mut response = relay(status, body);
    for cookie in cookies::issue_cookies(tokens, secure)? {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies::extract_cookie(header, name).map(str::to_string)
}
