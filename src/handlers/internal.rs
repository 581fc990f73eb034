// Internal handlers, called by schedulers and other backend services

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::services::ServiceContext;

pub const SERVER_TOKEN_HEADER: &str = "x-server-token";

/// POST /internal/healthcheck - liveness for task schedulers, guarded by
/// the shared server token. Other methods get 405 from the router.
pub async fn healthcheck(State(ctx): State<ServiceContext>, headers: HeaderMap) -> impl IntoResponse {
    let presented = headers.get(SERVER_TOKEN_HEADER).and_then(|v| v.to_str().ok());

    if !server_token_matches(&ctx.server_token, presented) {
        error!(has_token = presented.is_some(), "Rejected internal healthcheck: bad server token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Non autorisé" })),
        );
    }

    info!("Internal healthcheck");
    (StatusCode::OK, Json(json!({ "success": true, "status": "ok" })))
}

/// An unset expected token matches nothing. Digests are compared so the
/// comparison does not depend on where the strings first differ.
fn server_token_matches(expected: &str, presented: Option<&str>) -> bool {
    match presented {
        Some(token) if !expected.is_empty() => {
            Sha256::digest(token.as_bytes()) == Sha256::digest(expected.as_bytes())
        }
        _ => false,
    }
}
