//! Cookie building and parsing for the session cookie triple.
//!
//! The three cookies are always issued and cleared together. The two token
//! cookies are HttpOnly; `token_expiry` is deliberately readable by client
//! script so a browser-side agent can schedule proactive refreshes without
//! seeing the tokens themselves.

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;

use crate::upstream::TokenSet;

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const TOKEN_EXPIRY: &str = "token_expiry";

/// Access token cookie lifetime: one hour, matching the token itself.
pub const ACCESS_MAX_AGE_SECS: i64 = 60 * 60;
/// Refresh token and expiry-marker cookie lifetime: seven days.
pub const REFRESH_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: i64,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; SameSite=Lax; Max-Age={max_age_secs}");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Builds the three Set-Cookie values for a freshly granted token triple.
pub fn issue_cookies(
    tokens: &TokenSet,
    secure: bool,
) -> Result<Vec<HeaderValue>, InvalidHeaderValue> {
    Ok(vec![
        build_cookie(
            ACCESS_TOKEN,
            &tokens.access_token,
            ACCESS_MAX_AGE_SECS,
            true,
            secure,
        )?,
        build_cookie(
            REFRESH_TOKEN,
            &tokens.refresh_token,
            REFRESH_MAX_AGE_SECS,
            true,
            secure,
        )?,
        build_cookie(
            TOKEN_EXPIRY,
            &tokens.expires_at.to_string(),
            REFRESH_MAX_AGE_SECS,
            false,
            secure,
        )?,
    ])
}

/// Builds the three Set-Cookie values that destroy the session triple.
pub fn clear_cookies(secure: bool) -> Vec<HeaderValue> {
    [ACCESS_TOKEN, REFRESH_TOKEN, TOKEN_EXPIRY]
        .iter()
        .map(|&name| {
            build_cookie(name, "", 0, name != TOKEN_EXPIRY, secure)
                .expect("static cookie string should always parse")
        })
        .collect()
}

/// Finds a cookie value by name in a raw `Cookie` request header.
/// Empty values count as absent.
pub fn extract_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        (key == name && !value.is_empty()).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tokens() -> TokenSet {
        TokenSet {
            access_token: "acc-123".to_string(),
            refresh_token: "ref-456".to_string(),
            expires_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_issue_cookies_produces_three_records() {
        let cookies = issue_cookies(&sample_tokens(), false).unwrap();
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_token_cookies_are_http_only_but_expiry_is_not() {
        let cookies = issue_cookies(&sample_tokens(), false).unwrap();
        let values: Vec<&str> = cookies.iter().map(|c| c.to_str().unwrap()).collect();

        assert!(values[0].starts_with("access_token=acc-123"));
        assert!(values[0].contains("HttpOnly"));
        assert!(values[1].starts_with("refresh_token=ref-456"));
        assert!(values[1].contains("HttpOnly"));
        assert!(values[2].starts_with("token_expiry=1700000000"));
        assert!(!values[2].contains("HttpOnly"));
    }

    #[test]
    fn test_secure_flag_controls_secure_attribute() {
        let insecure = issue_cookies(&sample_tokens(), false).unwrap();
        let secure = issue_cookies(&sample_tokens(), true).unwrap();

        assert!(!insecure[0].to_str().unwrap().contains("Secure"));
        assert!(secure.iter().all(|c| c.to_str().unwrap().contains("Secure")));
    }

    #[test]
    fn test_access_and_refresh_lifetimes() {
        let cookies = issue_cookies(&sample_tokens(), false).unwrap();
        assert!(cookies[0].to_str().unwrap().contains("Max-Age=3600"));
        assert!(cookies[1].to_str().unwrap().contains("Max-Age=604800"));
        assert!(cookies[2].to_str().unwrap().contains("Max-Age=604800"));
    }

    #[test]
    fn test_clear_cookies_zero_max_age_for_all_three() {
        let cookies = clear_cookies(false);
        assert_eq!(cookies.len(), 3);
        for cookie in &cookies {
            assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
        }
    }

    #[test]
    fn test_extract_cookie_finds_value() {
        let header = "theme=dark; access_token=abc; token_expiry=123";
        assert_eq!(extract_cookie(header, "access_token"), Some("abc"));
        assert_eq!(extract_cookie(header, "token_expiry"), Some("123"));
    }

    #[test]
    fn test_extract_cookie_requires_exact_name() {
        let header = "access_token_shadow=evil";
        assert_eq!(extract_cookie(header, "access_token"), None);
    }

    #[test]
    fn test_extract_cookie_empty_value_is_absent() {
        assert_eq!(extract_cookie("access_token=", "access_token"), None);
        assert_eq!(extract_cookie("", "access_token"), None);
    }
}
