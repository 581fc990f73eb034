//! The fixed sequence every callable operation runs through:
//! caller identity, required fields, firewall, workspace authorization.
//! Domain validation and the repository call follow in each operation.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::ServiceContext;
use crate::auth::{is_valid_workspace_token, token_fingerprint};
use crate::database::DatabaseError;
use crate::error::{ErrorKind, MessageError};
use crate::firewall::FirewallError;
use crate::middleware::{handle_error, Caller, Responder, ResponseEnvelope};
use crate::types::{CallableOperation, WorkspaceRole};
use crate::validation::validate_required_fields;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Expected failure, returned to the caller as-is
    #[error("{0}")]
    Rejected(MessageError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Firewall(#[from] FirewallError),
}

impl From<MessageError> for ServiceError {
    fn from(error: MessageError) -> Self {
        ServiceError::Rejected(error)
    }
}

impl From<ErrorKind> for ServiceError {
    fn from(kind: ErrorKind) -> Self {
        ServiceError::Rejected(kind.error())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller cleared for one workspace
#[derive(Debug, Clone)]
pub struct Authorized {
    pub uid: String,
    pub workspace_id: String,
    pub role: WorkspaceRole,
    pub responder: Responder,
}

impl ServiceContext {
    /// Run the shared pipeline steps for `operation`, stopping at the first
    /// failure.
    pub async fn guard(
        &self,
        operation: CallableOperation,
        caller: Option<&Caller>,
        payload: &Value,
    ) -> ServiceResult<Authorized> {
        let caller = caller.ok_or(ErrorKind::Unauthenticated)?;

        validate_required_fields(payload, operation.required_fields())?;

        self.firewall.check(operation.name())?;

        let token = payload.get("workspaceToken").and_then(Value::as_str);
        let validation = self
            .gate
            .verify_workspace_token(token, &caller.uid, operation.required_role())
            .await;

        if !validation.is_valid() {
            let fingerprint = token.map(token_fingerprint).unwrap_or_default();
            debug!(
                operation = operation.name(),
                user_id = %caller.uid,
                token = %fingerprint,
                state = validation.state.code(),
                "Workspace authorization denied"
            );
        }

        let authorized = is_valid_workspace_token(validation).into_result()?;
        Ok(Authorized {
            uid: caller.uid.clone(),
            workspace_id: authorized.workspace_id,
            role: authorized.role,
            responder: Responder::with_tokens(Some(authorized.workspace_tokens)),
        })
    }
}

/// Operation-specific fields; a type mismatch is bad input, not a crash
pub fn parse_payload<T: DeserializeOwned>(payload: &Value) -> ServiceResult<T> {
    serde_json::from_value(payload.clone()).map_err(|e| {
        ServiceError::Rejected(ErrorKind::InvalidInput.error().with_detail("error", e.to_string()))
    })
}

/// Collapse a pipeline outcome into the envelope sent to the caller
pub fn finish<T>(
    operation: CallableOperation,
    result: ServiceResult<ResponseEnvelope<T>>,
) -> ResponseEnvelope<T> {
    match result {
        Ok(envelope) => envelope,
        Err(ServiceError::Rejected(error)) => ResponseEnvelope::failure(error),
        Err(e) => handle_error(operation.name(), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Target {
        text_id: String,
    }

    #[test]
    fn payload_type_mismatch_is_invalid_input() {
        let err = parse_payload::<Target>(&json!({"textId": 42})).unwrap_err();
        match err {
            ServiceError::Rejected(e) => {
                assert_eq!(e.code, "INVALID_INPUT");
                assert!(e.details.unwrap().contains_key("error"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let ok: Target = parse_payload(&json!({"textId": "abc"})).unwrap();
        assert_eq!(ok.text_id, "abc");
    }

    #[test]
    fn unexpected_errors_become_internal_error() {
        let result: ServiceResult<ResponseEnvelope<()>> =
            Err(DatabaseError::QueryError("connection reset".to_string()).into());
        let err = finish(CallableOperation::GetTexts, result).into_result().unwrap_err();
        assert_eq!(err.code, "INTERNAL_ERROR");
        assert_eq!(
            err.details.unwrap()["error"],
            json!("Query error: connection reset")
        );
    }

    #[test]
    fn rejections_pass_through_unchanged() {
        let result: ServiceResult<ResponseEnvelope<()>> =
            Err(ErrorKind::NotFound.with_message("Texte non trouvé").into());
        let err = finish(CallableOperation::DeleteText, result).into_result().unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Texte non trouvé");
        assert!(err.details.is_none());
    }
}
