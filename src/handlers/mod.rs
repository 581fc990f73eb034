// handlers/mod.rs - HTTP surface
//
// Public (no caller identity) and protected (callable operations, caller
// identified by the identity token). Every protected route answers HTTP 200
// with a response envelope. Internal routes are server-to-server and
// authenticated by a shared token instead.
pub mod internal;
pub mod protected;
pub mod public;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::middleware::identify_caller;
use crate::services::ServiceContext;

/// Full application router
pub fn app(ctx: ServiceContext, cors_origins: &[String]) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Server-to-server
        .route("/internal/healthcheck", post(internal::healthcheck))
        // Callable operations
        .merge(operation_routes(&ctx))
        // Global middleware
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn operation_routes(ctx: &ServiceContext) -> Router<ServiceContext> {
    use protected::{comments, texts};

    Router::new()
        .route("/api/listComments", post(comments::list_comments))
        .route("/api/createComment", post(comments::create_comment))
        .route("/api/deleteComment", post(comments::delete_comment))
        .route("/api/createText", post(texts::create_text))
        .route("/api/getTexts", post(texts::get_texts))
        .route("/api/updateText", post(texts::update_text))
        .route("/api/deleteText", post(texts::delete_text))
        .layer(middleware::from_fn_with_state(ctx.identity.clone(), identify_caller))
}

/// `*` allows any origin; otherwise only the listed origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
