use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::pipeline::{finish, parse_payload, ServiceResult};
use super::ServiceContext;
use crate::database::models::{NewText, Text, TextChanges};
use crate::error::ErrorKind;
use crate::middleware::{Caller, ResponseEnvelope};
use crate::types::CallableOperation;
use crate::validation::{to_invalid_input_error, validate_text_data, validate_text_update, CreateTextInput};

pub const DEFAULT_TITLE: &str = "Sans titre";
const TEXT_NOT_FOUND: &str = "Texte non trouvé";

#[derive(Debug, Clone, Serialize)]
pub struct TextPayload {
    pub text: Text,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextsPayload {
    pub texts: Vec<Text>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedPayload {
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTextRequest {
    text_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteTextRequest {
    text_id: String,
}

/// Blank titles fall back to the default title
fn normalize_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

pub async fn create_text(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
) -> ResponseEnvelope<TextPayload> {
    let operation = CallableOperation::CreateText;
    finish(operation, try_create_text(ctx, caller, payload, operation).await)
}

async fn try_create_text(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
    operation: CallableOperation,
) -> ServiceResult<ResponseEnvelope<TextPayload>> {
    let auth = ctx.guard(operation, caller, payload).await?;
    let input: CreateTextInput = parse_payload(payload)?;

    let input = CreateTextInput {
        title: Some(normalize_title(input.title.as_deref())),
        content: input.content.trim().to_string(),
    };

    let validation = validate_text_data(&input);
    if !validation.valid {
        return Err(to_invalid_input_error(&validation.errors).into());
    }
    if !validation.warnings.is_empty() {
        debug!(workspace_id = %auth.workspace_id, warnings = ?validation.warnings, "Text validation warnings");
    }

    let text = ctx
        .texts
        .create(
            &auth.workspace_id,
            NewText {
                title: input.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                content: input.content,
                created_by: auth.uid.clone(),
            },
        )
        .await?;

    info!(
        workspace_id = %auth.workspace_id,
        user_id = %auth.uid,
        action = "create_text",
        text_id = %text.id,
        "Text created"
    );
    Ok(auth.responder.success(TextPayload { text }))
}

pub async fn get_texts(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
) -> ResponseEnvelope<TextsPayload> {
    let operation = CallableOperation::GetTexts;
    finish(operation, try_get_texts(ctx, caller, payload, operation).await)
}

async fn try_get_texts(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
    operation: CallableOperation,
) -> ServiceResult<ResponseEnvelope<TextsPayload>> {
    let auth = ctx.guard(operation, caller, payload).await?;
    let texts = ctx.texts.list_by_workspace(&auth.workspace_id).await?;

    info!(
        workspace_id = %auth.workspace_id,
        user_id = %auth.uid,
        action = "get_texts",
        count = texts.len(),
        "Texts listed"
    );
    Ok(auth.responder.success(TextsPayload { texts }))
}

pub async fn update_text(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
) -> ResponseEnvelope<TextPayload> {
    let operation = CallableOperation::UpdateText;
    finish(operation, try_update_text(ctx, caller, payload, operation).await)
}

async fn try_update_text(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
    operation: CallableOperation,
) -> ServiceResult<ResponseEnvelope<TextPayload>> {
    let auth = ctx.guard(operation, caller, payload).await?;
    let request: UpdateTextRequest = parse_payload(payload)?;

    let changes = TextChanges {
        title: request.title.as_deref().map(|t| normalize_title(Some(t))),
        content: request.content.as_deref().map(|c| c.trim().to_string()),
    };

    let validation = validate_text_update(changes.title.as_deref(), changes.content.as_deref());
    if !validation.valid {
        return Err(to_invalid_input_error(&validation.errors).into());
    }

    let text = ctx
        .texts
        .update(&request.text_id, &auth.workspace_id, changes)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message(TEXT_NOT_FOUND))?;

    info!(
        workspace_id = %auth.workspace_id,
        user_id = %auth.uid,
        action = "update_text",
        text_id = %text.id,
        "Text updated"
    );
    Ok(auth.responder.success(TextPayload { text }))
}

pub async fn delete_text(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
) -> ResponseEnvelope<DeletedPayload> {
    let operation = CallableOperation::DeleteText;
    finish(operation, try_delete_text(ctx, caller, payload, operation).await)
}

async fn try_delete_text(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
    operation: CallableOperation,
) -> ServiceResult<ResponseEnvelope<DeletedPayload>> {
    let auth = ctx.guard(operation, caller, payload).await?;
    let request: DeleteTextRequest = parse_payload(payload)?;

    if !ctx.texts.delete(&request.text_id, &auth.workspace_id).await? {
        return Err(ErrorKind::NotFound.with_message(TEXT_NOT_FOUND).into());
    }

    info!(
        workspace_id = %auth.workspace_id,
        user_id = %auth.uid,
        action = "delete_text",
        text_id = %request.text_id,
        "Text deleted"
    );
    Ok(auth.responder.success(DeletedPayload { deleted: true }))
}
