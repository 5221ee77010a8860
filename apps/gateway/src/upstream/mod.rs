/// Upstream auth client — the single point of contact with the platform's
/// authentication backend.
///
/// ARCHITECTURAL RULE: No other module may call the upstream API directly.
/// All signin/refresh/logout traffic MUST go through this module, so the
/// token-extraction contract lives in exactly one place.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

const SIGNIN_PATH: &str = "/auth/signin";
const REFRESH_PATH: &str = "/auth/refresh";
const LOGOUT_PATH: &str = "/auth/logout";
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned a success status without a token payload")]
    MissingTokens,
}

/// The token triple the upstream returns at `data.tokens` on every grant.
/// `expires_at` is an absolute unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Credentials accepted by the signin route and forwarded upstream verbatim.
#[derive(Debug, Serialize, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Typed outcome of a token exchange. The relayed body stays verbatim; the
/// decision — grant or denial — is made here, not re-derived by handlers from
/// untyped JSON.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Upstream granted a session: a full token triple was present.
    Granted {
        status: u16,
        tokens: TokenSet,
        body: Value,
    },
    /// Upstream rejected the exchange. Status and body are relayed unchanged.
    Denied { status: u16, body: Value },
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Exchanges credentials for a token triple.
    pub async fn signin(&self, credentials: &SigninRequest) -> Result<AuthOutcome, UpstreamError> {
        self.exchange(SIGNIN_PATH, json!(credentials)).await
    }

    /// Exchanges a refresh token for a fresh token triple.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthOutcome, UpstreamError> {
        self.exchange(REFRESH_PATH, json!({ "refresh_token": refresh_token }))
            .await
    }

    /// Invalidates the upstream session for the given access token.
    /// Returns the upstream status; callers decide how much they care.
    pub async fn logout(&self, access_token: &str) -> Result<u16, UpstreamError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, LOGOUT_PATH))
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }

    async fn exchange(&self, path: &str, payload: Value) -> Result<AuthOutcome, UpstreamError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .unwrap_or_else(|_| json!({ "success": false, "message": text }));

        if !(200..300).contains(&status) {
            debug!("Upstream denied {path} with status {status}");
            return Ok(AuthOutcome::Denied { status, body });
        }

        match extract_tokens(&body) {
            Some(tokens) => Ok(AuthOutcome::Granted {
                status,
                tokens,
                body,
            }),
            None => Err(UpstreamError::MissingTokens),
        }
    }
}

/// Pulls the token triple out of an upstream grant body.
/// The contract places it at `data.tokens.{access_token, refresh_token, expires_at}`.
pub fn extract_tokens(body: &Value) -> Option<TokenSet> {
    let tokens = body.get("data")?.get("tokens")?;
    Some(TokenSet {
        access_token: tokens.get("access_token")?.as_str()?.to_string(),
        refresh_token: tokens.get("refresh_token")?.as_str()?.to_string(),
        expires_at: tokens.get("expires_at")?.as_i64()?,
    })
}
