//! Authentication collaborator: a static bearer token plus the operator
//! identity attached to every request that passes it. Real directory-backed
//! auth lives elsewhere in the console; the engine only needs an operator id
//! for merge bookkeeping.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::AppState;
use crate::api::ApiError;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    token: Option<String>,
}

impl AuthConfig {
    /// Read the expected token from the named env var. An unset or empty
    /// var disables the token check (local development).
    pub fn from_env(var_name: &str) -> Self {
        Self {
            token: std::env::var(var_name).ok().filter(|t| !t.is_empty()),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { token: None }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// The operator performing the request, recorded on merges and audit rows.
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: String,
}

pub async fn require_operator(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = state.auth.token() {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        if presented != Some(expected) {
            return ApiError::Unauthorized.into_response();
        }
    }

    let operator_id = request
        .headers()
        .get("x-operator-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("system")
        .to_string();
    request.extensions_mut().insert(Operator { id: operator_id });

    next.run(request).await
}
