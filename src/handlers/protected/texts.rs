use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde_json::Value;

use super::{caller_ref, read_payload};
use crate::middleware::{Caller, ResponseEnvelope};
use crate::services::{self, DeletedPayload, ServiceContext, TextPayload, TextsPayload};

/// POST /api/createText
pub async fn create_text(
    State(ctx): State<ServiceContext>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ResponseEnvelope<TextPayload> {
    match read_payload(&caller, body) {
        Ok(payload) => services::create_text(&ctx, caller_ref(&caller), &payload).await,
        Err(e) => ResponseEnvelope::failure(e),
    }
}

/// POST /api/getTexts
pub async fn get_texts(
    State(ctx): State<ServiceContext>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ResponseEnvelope<TextsPayload> {
    match read_payload(&caller, body) {
        Ok(payload) => services::get_texts(&ctx, caller_ref(&caller), &payload).await,
        Err(e) => ResponseEnvelope::failure(e),
    }
}

/// POST /api/updateText
pub async fn update_text(
    State(ctx): State<ServiceContext>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ResponseEnvelope<TextPayload> {
    match read_payload(&caller, body) {
        Ok(payload) => services::update_text(&ctx, caller_ref(&caller), &payload).await,
        Err(e) => ResponseEnvelope::failure(e),
    }
}

/// POST /api/deleteText
pub async fn delete_text(
    State(ctx): State<ServiceContext>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ResponseEnvelope<DeletedPayload> {
    match read_payload(&caller, body) {
        Ok(payload) => services::delete_text(&ctx, caller_ref(&caller), &payload).await,
        Err(e) => ResponseEnvelope::failure(e),
    }
}
