pub mod health;

use axum::{
    http::Uri,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::handlers;
use crate::errors::AppError;
use crate::gate;
use crate::state::AppState;

/// Any path the router does not know is a page request: the gate middleware
/// has already vetted it, and this service does not render pages itself.
async fn not_found(uri: Uri) -> Result<(), AppError> {
    Err(AppError::NotFound(format!("No route for {}", uri.path())))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/auth/signin", post(handlers::handle_signin))
        .route("/api/auth/refresh", post(handlers::handle_refresh))
        .route("/api/auth/logout", post(handlers::handle_logout))
        .fallback(not_found)
        .layer(middleware::from_fn(gate::auth_gate))
        .with_state(state)
}
