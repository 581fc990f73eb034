use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::pipeline::{finish, parse_payload, ServiceResult};
use super::text_service::DeletedPayload;
use super::ServiceContext;
use crate::database::models::{Comment, NewComment};
use crate::error::ErrorKind;
use crate::middleware::{Caller, ResponseEnvelope};
use crate::types::CallableOperation;
use crate::validation::comment_text;

const COMMENT_NOT_FOUND: &str = "Commentaire non trouvé";

#[derive(Debug, Clone, Serialize)]
pub struct CommentPayload {
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsPayload {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteCommentRequest {
    comment_id: String,
}

pub async fn list_comments(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
) -> ResponseEnvelope<CommentsPayload> {
    let operation = CallableOperation::ListComments;
    finish(operation, try_list_comments(ctx, caller, payload, operation).await)
}

async fn try_list_comments(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
    operation: CallableOperation,
) -> ServiceResult<ResponseEnvelope<CommentsPayload>> {
    let auth = ctx.guard(operation, caller, payload).await?;
    let comments = ctx.comments.list_by_workspace(&auth.workspace_id).await?;

    info!(
        workspace_id = %auth.workspace_id,
        user_id = %auth.uid,
        action = "list_comments",
        count = comments.len(),
        "Comments listed"
    );
    Ok(auth.responder.success(CommentsPayload { comments }))
}

pub async fn create_comment(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
) -> ResponseEnvelope<CommentPayload> {
    let operation = CallableOperation::CreateComment;
    finish(operation, try_create_comment(ctx, caller, payload, operation).await)
}

async fn try_create_comment(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
    operation: CallableOperation,
) -> ServiceResult<ResponseEnvelope<CommentPayload>> {
    let auth = ctx.guard(operation, caller, payload).await?;
    let text = comment_text(payload)?;

    let comment = ctx
        .comments
        .create(
            &auth.workspace_id,
            NewComment {
                text: text.trim().to_string(),
                author_id: auth.uid.clone(),
            },
        )
        .await?;

    info!(
        workspace_id = %auth.workspace_id,
        user_id = %auth.uid,
        action = "create_comment",
        comment_id = %comment.id,
        "Comment created"
    );
    Ok(auth.responder.success(CommentPayload { comment }))
}

pub async fn delete_comment(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
) -> ResponseEnvelope<DeletedPayload> {
    let operation = CallableOperation::DeleteComment;
    finish(operation, try_delete_comment(ctx, caller, payload, operation).await)
}

async fn try_delete_comment(
    ctx: &ServiceContext,
    caller: Option<&Caller>,
    payload: &Value,
    operation: CallableOperation,
) -> ServiceResult<ResponseEnvelope<DeletedPayload>> {
    let auth = ctx.guard(operation, caller, payload).await?;
    let request: DeleteCommentRequest = parse_payload(payload)?;

    if !ctx.comments.delete(&request.comment_id, &auth.workspace_id).await? {
        return Err(ErrorKind::NotFound.with_message(COMMENT_NOT_FOUND).into());
    }

    info!(
        workspace_id = %auth.workspace_id,
        user_id = %auth.uid,
        action = "delete_comment",
        comment_id = %request.comment_id,
        "Comment deleted"
    );
    Ok(auth.responder.success(DeletedPayload { deleted: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::Workspace;
    use crate::types::WorkspaceRole;
    use serde_json::json;

    async fn context() -> ServiceContext {
        let ctx = ServiceContext::in_memory(&AppConfig::development());
        for id in ["ws-a", "ws-b"] {
            ctx.workspaces
                .create(Workspace {
                    id: id.to_string(),
                    name: id.to_string(),
                    color: None,
                    owner_id: "owner".to_string(),
                })
                .await
                .unwrap();
        }
        ctx
    }

    async fn member(ctx: &ServiceContext, workspace: &str, uid: &str, role: WorkspaceRole) -> String {
        ctx.workspaces.add_member(workspace, uid, role).await.unwrap();
        ctx.gate.issue_token(uid, workspace, role).unwrap()
    }

    fn caller(uid: &str) -> Caller {
        Caller { uid: uid.to_string() }
    }

    #[tokio::test]
    async fn comments_round_trip_within_a_workspace() {
        let ctx = context().await;
        let token = member(&ctx, "ws-a", "u1", WorkspaceRole::Admin).await;

        let comment = create_comment(&ctx, Some(&caller("u1")), &json!({"workspaceToken": token, "text": " Nice "}))
            .await
            .into_result()
            .unwrap()
            .comment;
        assert_eq!(comment.text, "Nice");
        assert_eq!(comment.author_id, "u1");

        let listed = list_comments(&ctx, Some(&caller("u1")), &json!({"workspaceToken": token}))
            .await
            .into_result()
            .unwrap()
            .comments;
        assert_eq!(listed.len(), 1);

        let deleted = delete_comment(
            &ctx,
            Some(&caller("u1")),
            &json!({"workspaceToken": token, "commentId": comment.id.to_string()}),
        )
        .await
        .into_result()
        .unwrap();
        assert_eq!(deleted, DeletedPayload { deleted: true });
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let ctx = context().await;
        let token = member(&ctx, "ws-a", "u1", WorkspaceRole::Editor).await;

        let err = create_comment(&ctx, Some(&caller("u1")), &json!({"workspaceToken": token, "text": "   "}))
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.message, "Texte invalide");
    }

    #[tokio::test]
    async fn non_string_comment_is_rejected() {
        let ctx = context().await;
        let token = member(&ctx, "ws-a", "u1", WorkspaceRole::Editor).await;

        let err = create_comment(&ctx, Some(&caller("u1")), &json!({"workspaceToken": token, "text": 42}))
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.message, "Texte invalide");
        assert!(err.details.is_none());
    }

    #[tokio::test]
    async fn cannot_delete_another_workspaces_comment() {
        let ctx = context().await;
        let token_a = member(&ctx, "ws-a", "u1", WorkspaceRole::Admin).await;
        let token_b = member(&ctx, "ws-b", "u2", WorkspaceRole::Admin).await;

        let foreign = create_comment(&ctx, Some(&caller("u2")), &json!({"workspaceToken": token_b, "text": "b"}))
            .await
            .into_result()
            .unwrap()
            .comment;

        let err = delete_comment(
            &ctx,
            Some(&caller("u1")),
            &json!({"workspaceToken": token_a, "commentId": foreign.id.to_string()}),
        )
        .await
        .into_result()
        .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Commentaire non trouvé");

        let still_there = ctx.comments.list_by_workspace("ws-b").await.unwrap();
        assert_eq!(still_there.len(), 1);
    }

    #[tokio::test]
    async fn missing_caller_is_unauthenticated() {
        let ctx = context().await;
        let err = list_comments(&ctx, None, &json!({"workspaceToken": "anything"}))
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.code, "UNAUTHENTICATED");
    }
}
