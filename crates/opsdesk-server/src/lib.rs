//! opsdesk HTTP server: the Detect and Merge operations of the duplicate
//! merge engine, behind a bearer-token auth layer.

pub mod api;
pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use opsdesk_core::{Database, ServerConfig};

pub use auth::{AuthConfig, Operator};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthConfig>,
}

async fn index() -> &'static str {
    "opsdesk"
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(db: Arc<Database>, auth: AuthConfig) -> Router {
    let state = AppState {
        db,
        auth: Arc::new(auth),
    };

    let api_routes = Router::new()
        .route("/duplicates", get(handlers::detect))
        .route("/duplicates/merge", post(handlers::merge))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_operator,
        ));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(config: &ServerConfig, db: Arc<Database>) -> std::io::Result<()> {
    let auth = AuthConfig::from_env(&config.auth_token_env);
    let app = router(db, auth);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("opsdesk server listening on {addr}");
    axum::serve(listener, app).await
}
