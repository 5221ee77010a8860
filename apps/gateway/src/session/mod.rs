//! Session client for native consumers of the gateway (CLI, desktop shell).
//!
//! Owns the cookie jar for the gateway origin and keeps the session alive the
//! same way the browser agent does: a scheduled proactive refresh before
//! expiry, plus a single refresh-and-retry when a call comes back 401.
//! Session-ending conditions are surfaced as [`SessionEvent`]s on a channel;
//! the embedding app decides how to route the user back to login.

pub mod scheduler;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, StatusCode, Url};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::{cookies, AuthMessage};
use crate::session::scheduler::{RefreshScheduler, SchedulerConfig};
use crate::upstream::SigninRequest;

const SIGNIN_ROUTE: &str = "/api/auth/signin";
const REFRESH_ROUTE: &str = "/api/auth/refresh";
const LOGOUT_ROUTE: &str = "/api/auth/logout";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    #[error("Signin rejected (status {status})")]
    SigninFailed { status: u16 },

    #[error("Refresh rejected (status {status})")]
    RefreshFailed { status: u16 },

    #[error("Unauthorized after refresh retry")]
    Unauthorized,
}

/// Session lifecycle notifications for the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session could not be kept alive; route the user to login with the
    /// carried message.
    Expired(AuthMessage),
    /// The user logged out deliberately.
    LoggedOut,
}

/// Client-side session manager. Cheap to clone; all clones share the cookie
/// jar, the single-flight refresh state, and the event channel.
#[derive(Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: String,
    origin: Url,
    /// Serializes refreshes: one in flight at a time.
    refresh_lock: Arc<Mutex<()>>,
    /// Bumped after every successful refresh. A caller that observed
    /// generation N and then finds it changed knows someone else already
    /// refreshed on its behalf.
    refresh_generation: Arc<AtomicU64>,
    scheduler: Arc<StdMutex<Option<RefreshScheduler>>>,
    events: UnboundedSender<SessionEvent>,
}

impl SessionClient {
    /// Builds a session client for the given gateway origin, returning the
    /// receiving end of the session event channel alongside it.
    pub fn new(gateway_url: &str) -> Result<(Self, UnboundedReceiver<SessionEvent>), SessionError> {
        let base_url = gateway_url.trim_end_matches('/').to_string();
        let origin =
            Url::parse(&base_url).map_err(|_| SessionError::InvalidUrl(base_url.clone()))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        let (events, receiver) = mpsc::unbounded_channel();

        Ok((
            Self {
                http,
                jar,
                base_url,
                origin,
                refresh_lock: Arc::new(Mutex::new(())),
                refresh_generation: Arc::new(AtomicU64::new(0)),
                scheduler: Arc::new(StdMutex::new(None)),
                events,
            },
            receiver,
        ))
    }

    /// Signs in through the gateway. On success the cookie triple lands in
    /// the jar and every subsequent request carries it automatically.
    pub async fn signin(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let response = self
            .http
            .post(self.endpoint(SIGNIN_ROUTE))
            .json(&SigninRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::SigninFailed {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Starts (or restarts) the proactive refresh task for this session.
    pub fn start_refresh_task(&self, config: SchedulerConfig) {
        let mut slot = self.scheduler.lock().expect("scheduler mutex poisoned");
        if let Some(previous) = slot.take() {
            previous.stop();
        }
        *slot = Some(RefreshScheduler::start(self.clone(), config));
    }

    /// Stops the proactive refresh task, if one is running.
    pub fn stop_refresh_task(&self) {
        let mut slot = self.scheduler.lock().expect("scheduler mutex poisoned");
        if let Some(task) = slot.take() {
            task.stop();
        }
    }

    /// Refreshes the session through the gateway, coalescing concurrent
    /// callers into a single upstream call.
    ///
    /// A caller that loses the race simply observes the winner's result: by
    /// the time it holds the lock the generation has moved on, so it returns
    /// without issuing a second refresh.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let observed = self.refresh_generation.load(Ordering::Acquire);
        let _flight = self.refresh_lock.lock().await;

        if self.refresh_generation.load(Ordering::Acquire) != observed {
            debug!("Refresh coalesced with an in-flight call");
            return Ok(());
        }

        let outcome = async {
            let response = self.http.post(self.endpoint(REFRESH_ROUTE)).send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(SessionError::RefreshFailed {
                    status: status.as_u16(),
                })
            }
        }
        .await;

        match outcome {
            Ok(()) => {
                self.refresh_generation.fetch_add(1, Ordering::Release);
                debug!("Session refreshed");
                Ok(())
            }
            Err(err) => {
                let _ = self
                    .events
                    .send(SessionEvent::Expired(AuthMessage::SessionExpired));
                Err(err)
            }
        }
    }

    /// Executes a request with the session's cookie jar and at most one
    /// refresh-and-retry on 401. A second 401 after the retry ends the
    /// session.
    pub async fn execute(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, SessionError> {
        let retry = request.try_clone();

        let response = self.http.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Streaming bodies cannot be cloned for replay; treat as exhausted.
        let Some(retry) = retry else {
            let _ = self
                .events
                .send(SessionEvent::Expired(AuthMessage::SessionExpired));
            return Err(SessionError::Unauthorized);
        };

        self.refresh().await?;

        let response = self.http.execute(retry).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let _ = self
                .events
                .send(SessionEvent::Expired(AuthMessage::SessionExpired));
            return Err(SessionError::Unauthorized);
        }
        Ok(response)
    }

    /// Builds a request that will carry the session cookies when executed
    /// against the gateway origin.
    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http.request(method, url)
    }

    /// Logs out: stops the refresh task, tells the gateway (which clears the
    /// cookie triple via Set-Cookie), and emits [`SessionEvent::LoggedOut`].
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.stop_refresh_task();

        let response = self.http.post(self.endpoint(LOGOUT_ROUTE)).send().await?;
        debug!("Logout acknowledged with status {}", response.status());

        let _ = self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Reads the session expiry (unix seconds) from the client-visible
    /// `token_expiry` cookie. `None` when no session is established.
    pub fn token_expiry(&self) -> Option<i64> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;
        cookies::extract_cookie(header, cookies::TOKEN_EXPIRY)?
            .parse()
            .ok()
    }

    /// Seconds until the session expires; negative once it already has.
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.token_expiry()
            .map(|expires_at| expires_at - Utc::now().timestamp())
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}
