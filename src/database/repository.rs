use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Comment, NewComment, NewText, Text, TextChanges, Workspace, WorkspaceMember};
use crate::types::WorkspaceRole;

/// Texts, always scoped by `workspace_id`. Ids that do not parse as UUIDs
/// match no row.
#[async_trait]
pub trait TextRepository: Send + Sync {
    /// Newest first
    async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Text>, DatabaseError>;

    async fn get_by_id(&self, id: &str, workspace_id: &str) -> Result<Option<Text>, DatabaseError>;

    async fn create(&self, workspace_id: &str, data: NewText) -> Result<Text, DatabaseError>;

    /// `None` when no row matched `(id, workspace_id)`
    async fn update(
        &self,
        id: &str,
        workspace_id: &str,
        changes: TextChanges,
    ) -> Result<Option<Text>, DatabaseError>;

    /// Whether a row was removed
    async fn delete(&self, id: &str, workspace_id: &str) -> Result<bool, DatabaseError>;

    async fn count(&self, workspace_id: &str) -> Result<i64, DatabaseError>;

    /// Storage liveness
    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Newest first
    async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Comment>, DatabaseError>;

    async fn create(&self, workspace_id: &str, data: NewComment) -> Result<Comment, DatabaseError>;

    async fn delete(&self, id: &str, workspace_id: &str) -> Result<bool, DatabaseError>;
}

/// Workspaces and their memberships; the source of truth for roles
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>, DatabaseError>;

    async fn create(&self, workspace: Workspace) -> Result<Workspace, DatabaseError>;

    /// Create the workspace and make its owner an admin, atomically.
    /// Neither row exists if either write fails.
    async fn create_with_owner(&self, workspace: Workspace) -> Result<(Workspace, WorkspaceMember), DatabaseError>;

    async fn find_member(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<WorkspaceMember>, DatabaseError>;

    async fn list_memberships_for_user(&self, user_id: &str) -> Result<Vec<WorkspaceMember>, DatabaseError>;

    /// Insert or change the member's role
    async fn add_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<WorkspaceMember, DatabaseError>;
}
