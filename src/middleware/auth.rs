use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{token_fingerprint, IdentityProvider};

/// Caller established by the identity token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub uid: String,
}

/// Identify the caller from `Authorization: Bearer <jwt>`.
///
/// Never rejects: a missing or invalid token just leaves the request without
/// a `Caller` extension, and each operation answers `UNAUTHENTICATED` inside
/// its envelope.
pub async fn identify_caller(
    State(identity): State<Arc<IdentityProvider>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_bearer_token(&headers) {
        Ok(token) => match identity.verify(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(Caller { uid: claims.sub });
            }
            Err(e) => {
                debug!(token = %token_fingerprint(&token), "Identity token rejected: {}", e);
            }
        },
        Err(msg) => debug!("No caller identity: {}", msg),
    }

    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
