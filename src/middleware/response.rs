use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::{ErrorKind, MessageError};
use crate::types::WorkspaceTokenMap;

/// Result of every callable operation. Exactly one variant is populated;
/// branch on it (or call `is_success`) before touching the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope<T> {
    Success {
        payload: T,
        workspace_tokens: Option<WorkspaceTokenMap>,
    },
    Failure {
        error: MessageError,
    },
}

impl<T> ResponseEnvelope<T> {
    /// Success without refreshed tokens; the field is omitted on the wire
    pub fn success(payload: T) -> Self {
        ResponseEnvelope::Success {
            payload,
            workspace_tokens: None,
        }
    }

    pub fn success_with_tokens(payload: T, workspace_tokens: Option<WorkspaceTokenMap>) -> Self {
        ResponseEnvelope::Success {
            payload,
            workspace_tokens,
        }
    }

    pub fn failure(error: impl Into<MessageError>) -> Self {
        ResponseEnvelope::Failure { error: error.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            ResponseEnvelope::Success { payload, .. } => Some(payload),
            ResponseEnvelope::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&MessageError> {
        match self {
            ResponseEnvelope::Success { .. } => None,
            ResponseEnvelope::Failure { error } => Some(error),
        }
    }

    pub fn workspace_tokens(&self) -> Option<&WorkspaceTokenMap> {
        match self {
            ResponseEnvelope::Success { workspace_tokens, .. } => workspace_tokens.as_ref(),
            ResponseEnvelope::Failure { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<T, MessageError> {
        match self {
            ResponseEnvelope::Success { payload, .. } => Ok(payload),
            ResponseEnvelope::Failure { error } => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        match self {
            ResponseEnvelope::Success {
                payload,
                workspace_tokens,
            } => ResponseEnvelope::Success {
                payload: f(payload),
                workspace_tokens,
            },
            ResponseEnvelope::Failure { error } => ResponseEnvelope::Failure { error },
        }
    }
}

/// `{success: true, ...payload, workspace_tokens?}` or `{success: false, error}`
impl<T: Serialize> Serialize for ResponseEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseEnvelope::Success {
                payload,
                workspace_tokens,
            } => {
                #[derive(Serialize)]
                struct SuccessBody<'a, P: Serialize> {
                    success: bool,
                    #[serde(flatten)]
                    payload: &'a P,
                    #[serde(skip_serializing_if = "Option::is_none")]
                    workspace_tokens: Option<&'a WorkspaceTokenMap>,
                }

                SuccessBody {
                    success: true,
                    payload,
                    workspace_tokens: workspace_tokens.as_ref(),
                }
                .serialize(serializer)
            }
            ResponseEnvelope::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Envelopes always travel as HTTP 200 so that platform retries never fire on
/// business failures.
impl<T: Serialize> IntoResponse for ResponseEnvelope<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response envelope: {}", e);
                let error = ErrorKind::InternalError
                    .error()
                    .with_detail("error", "Failed to serialize response data");
                (StatusCode::OK, Json(json!({ "success": false, "error": error }))).into_response()
            }
        }
    }
}

/// Builds envelopes that carry the token map refreshed during authorization
#[derive(Debug, Clone, Default)]
pub struct Responder {
    workspace_tokens: Option<WorkspaceTokenMap>,
}

impl Responder {
    pub fn with_tokens(workspace_tokens: Option<WorkspaceTokenMap>) -> Self {
        Self { workspace_tokens }
    }

    pub fn success<T>(&self, payload: T) -> ResponseEnvelope<T> {
        ResponseEnvelope::success_with_tokens(payload, self.workspace_tokens.clone())
    }

    pub fn error<T>(&self, error: impl Into<MessageError>) -> ResponseEnvelope<T> {
        ResponseEnvelope::failure(error)
    }
}

/// Top-level conversion of an unexpected error into `INTERNAL_ERROR`
pub fn handle_error<T>(operation: &str, err: &dyn std::fmt::Display) -> ResponseEnvelope<T> {
    tracing::error!(operation = operation, "Unexpected error: {}", err);
    ResponseEnvelope::failure(
        ErrorKind::InternalError
            .error()
            .with_detail("error", Value::String(err.to_string())),
    )
}
