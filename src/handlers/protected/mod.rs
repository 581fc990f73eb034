// Callable operations. Caller identity comes from the `identify_caller`
// middleware; the body is the operation's JSON payload.
pub mod comments;
pub mod texts;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde_json::Value;

use crate::error::{ErrorKind, MessageError};
use crate::middleware::Caller;

/// Unreadable bodies are `INVALID_INPUT`, unless the caller is unknown, in
/// which case the pipeline reports `UNAUTHENTICATED` first.
pub(crate) fn read_payload(
    caller: &Option<Extension<Caller>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Value, MessageError> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(_) if caller.is_none() => Ok(Value::Null),
        Err(rejection) => Err(ErrorKind::InvalidInput
            .error()
            .with_detail("error", rejection.body_text())),
    }
}

pub(crate) fn caller_ref(caller: &Option<Extension<Caller>>) -> Option<&Caller> {
    caller.as_ref().map(|Extension(c)| c)
}
