pub mod cookies;
pub mod handlers;

use std::fmt;

/// Why a caller was bounced to the login page. Surfaced to the browser only
/// as a `message` query parameter; never persisted anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMessage {
    AuthRequired,
    SessionExpired,
    LoggedOut,
    Unauthorized,
}

impl AuthMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMessage::AuthRequired => "auth_required",
            AuthMessage::SessionExpired => "session_expired",
            AuthMessage::LoggedOut => "logged_out",
            AuthMessage::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for AuthMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
