#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use serde_json::{json, Value};

use gateway::config::Config;
use gateway::routes::build_router;
use gateway::state::AppState;
use gateway::upstream::UpstreamClient;

pub fn test_config(upstream_url: &str) -> Config {
    Config {
        api_base_url: upstream_url.to_string(),
        port: 0,
        cookie_secure: false,
        rust_log: "info".to_string(),
    }
}

pub fn test_app(upstream_url: &str) -> Router {
    let state = AppState {
        upstream: Arc::new(UpstreamClient::new(upstream_url)),
        config: test_config(upstream_url),
    };
    build_router(state)
}

/// Serves the gateway on an ephemeral port and returns its base URL.
pub async fn spawn_gateway(upstream_url: &str) -> String {
    let app = test_app(upstream_url);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve gateway");
    });

    format!("http://{addr}")
}

/// The upstream grant body shape: tokens under `data.tokens`.
pub fn grant_body(access: &str, refresh: &str, expires_at: i64) -> Value {
    json!({
        "success": true,
        "data": {
            "tokens": {
                "access_token": access,
                "refresh_token": refresh,
                "expires_at": expires_at
            }
        }
    })
}
