use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde_json::Value;

use super::{caller_ref, read_payload};
use crate::middleware::{Caller, ResponseEnvelope};
use crate::services::{self, CommentPayload, CommentsPayload, DeletedPayload, ServiceContext};

/// POST /api/listComments
pub async fn list_comments(
    State(ctx): State<ServiceContext>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ResponseEnvelope<CommentsPayload> {
    match read_payload(&caller, body) {
        Ok(payload) => services::list_comments(&ctx, caller_ref(&caller), &payload).await,
        Err(e) => ResponseEnvelope::failure(e),
    }
}

/// POST /api/createComment
pub async fn create_comment(
    State(ctx): State<ServiceContext>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ResponseEnvelope<CommentPayload> {
    match read_payload(&caller, body) {
        Ok(payload) => services::create_comment(&ctx, caller_ref(&caller), &payload).await,
        Err(e) => ResponseEnvelope::failure(e),
    }
}

/// POST /api/deleteComment
pub async fn delete_comment(
    State(ctx): State<ServiceContext>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ResponseEnvelope<DeletedPayload> {
    match read_payload(&caller, body) {
        Ok(payload) => services::delete_comment(&ctx, caller_ref(&caller), &payload).await,
        Err(e) => ResponseEnvelope::failure(e),
    }
}
