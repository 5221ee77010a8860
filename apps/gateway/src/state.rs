use std::sync::Arc;

use crate::config::Config;
use crate::upstream::UpstreamClient;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The gateway is stateless: no session data lives here, only the upstream
/// client and configuration. Tokens live in the caller's cookies.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub config: Config,
}
