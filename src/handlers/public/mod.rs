// Public handlers (no caller identity required)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};
use tracing::error;

use crate::services::ServiceContext;
use crate::types::CallableOperation;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let operations: Vec<String> = CallableOperation::ALL
        .iter()
        .map(|op| format!("/api/{}", op.name()))
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "Agentova API",
            "version": version,
            "description": "Workspace-scoped texts and comments",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "internal": "/internal/healthcheck (server token)",
                "operations": operations,
            }
        }
    }))
}

/// GET /health - storage liveness
pub async fn health(State(ctx): State<ServiceContext>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match ctx.texts.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
