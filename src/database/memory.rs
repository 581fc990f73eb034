//! In-process repositories for tests and the development demo.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Comment, NewComment, NewText, Text, TextChanges, Workspace, WorkspaceMember};
use crate::database::repository::{CommentRepository, TextRepository, WorkspaceRepository};
use crate::types::WorkspaceRole;

pub const DEMO_USER_ID: &str = "demo-user-123";
pub const DEMO_ADMIN_WORKSPACE: &str = "demo-workspace-123";
pub const DEMO_EDITOR_WORKSPACE: &str = "demo-workspace-456";

fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id.trim()).ok()
}

#[derive(Default)]
pub struct MemoryTextRepository {
    rows: RwLock<Vec<Text>>,
}

impl MemoryTextRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextRepository for MemoryTextRepository {
    async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Text>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut texts: Vec<Text> = rows
            .iter()
            .filter(|t| t.workspace_id == workspace_id)
            .cloned()
            .collect();
        texts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(texts)
    }

    async fn get_by_id(&self, id: &str, workspace_id: &str) -> Result<Option<Text>, DatabaseError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|t| t.id == id && t.workspace_id == workspace_id)
            .cloned())
    }

    async fn create(&self, workspace_id: &str, data: NewText) -> Result<Text, DatabaseError> {
        let now = Utc::now();
        let text = Text {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            title: data.title,
            content: data.content,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(text.clone());
        Ok(text)
    }

    async fn update(
        &self,
        id: &str,
        workspace_id: &str,
        changes: TextChanges,
    ) -> Result<Option<Text>, DatabaseError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let mut rows = self.rows.write().await;
        let Some(text) = rows
            .iter_mut()
            .find(|t| t.id == id && t.workspace_id == workspace_id)
        else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Ok(Some(text.clone()));
        }
        if let Some(title) = changes.title {
            text.title = title;
        }
        if let Some(content) = changes.content {
            text.content = content;
        }
        text.updated_at = Utc::now();
        Ok(Some(text.clone()))
    }

    async fn delete(&self, id: &str, workspace_id: &str) -> Result<bool, DatabaseError> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.workspace_id == workspace_id));
        Ok(rows.len() < before)
    }

    async fn count(&self, workspace_id: &str) -> Result<i64, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|t| t.workspace_id == workspace_id).count() as i64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCommentRepository {
    rows: RwLock<Vec<Comment>>,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Comment>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut comments: Vec<Comment> = rows
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn create(&self, workspace_id: &str, data: NewComment) -> Result<Comment, DatabaseError> {
        let comment = Comment {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            text: data.text,
            author_id: data.author_id,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: &str, workspace_id: &str) -> Result<bool, DatabaseError> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|c| !(c.id == id && c.workspace_id == workspace_id));
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryWorkspaceRepository {
    // Lock order: `workspaces` before `members`
    workspaces: RwLock<HashMap<String, Workspace>>,
    // (workspace_id, user_id) -> role
    members: RwLock<HashMap<(String, String), WorkspaceRole>>,
}

impl MemoryWorkspaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo data: one admin and one editor workspace for `demo-user-123`
    pub async fn seeded_demo() -> Result<Self, DatabaseError> {
        let repo = Self::new();
        for (id, name, color, role) in [
            (DEMO_ADMIN_WORKSPACE, "Demo workspace", "#4F46E5", WorkspaceRole::Admin),
            (DEMO_EDITOR_WORKSPACE, "Shared workspace", "#10B981", WorkspaceRole::Editor),
        ] {
            repo.create(Workspace {
                id: id.to_string(),
                name: name.to_string(),
                color: Some(color.to_string()),
                owner_id: DEMO_USER_ID.to_string(),
            })
            .await?;
            repo.add_member(id, DEMO_USER_ID, role).await?;
        }
        Ok(repo)
    }
}

#[async_trait]
impl WorkspaceRepository for MemoryWorkspaceRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>, DatabaseError> {
        Ok(self.workspaces.read().await.get(id).cloned())
    }

    async fn create(&self, workspace: Workspace) -> Result<Workspace, DatabaseError> {
        let mut workspaces = self.workspaces.write().await;
        if workspaces.contains_key(&workspace.id) {
            return Err(DatabaseError::QueryError(format!(
                "workspace '{}' already exists",
                workspace.id
            )));
        }
        workspaces.insert(workspace.id.clone(), workspace.clone());
        Ok(workspace)
    }

    async fn create_with_owner(&self, workspace: Workspace) -> Result<(Workspace, WorkspaceMember), DatabaseError> {
        let mut workspaces = self.workspaces.write().await;
        let mut members = self.members.write().await;
        if workspaces.contains_key(&workspace.id) {
            return Err(DatabaseError::QueryError(format!(
                "workspace '{}' already exists",
                workspace.id
            )));
        }

        let owner = WorkspaceMember {
            workspace_id: workspace.id.clone(),
            user_id: workspace.owner_id.clone(),
            role: WorkspaceRole::Admin,
        };
        workspaces.insert(workspace.id.clone(), workspace.clone());
        members.insert((owner.workspace_id.clone(), owner.user_id.clone()), owner.role);
        Ok((workspace, owner))
    }

    async fn find_member(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<WorkspaceMember>, DatabaseError> {
        let members = self.members.read().await;
        Ok(members
            .get(&(workspace_id.to_string(), user_id.to_string()))
            .map(|role| WorkspaceMember {
                workspace_id: workspace_id.to_string(),
                user_id: user_id.to_string(),
                role: *role,
            }))
    }

    async fn list_memberships_for_user(&self, user_id: &str) -> Result<Vec<WorkspaceMember>, DatabaseError> {
        let members = self.members.read().await;
        let mut memberships: Vec<WorkspaceMember> = members
            .iter()
            .filter(|((_, uid), _)| uid == user_id)
            .map(|((workspace_id, uid), role)| WorkspaceMember {
                workspace_id: workspace_id.clone(),
                user_id: uid.clone(),
                role: *role,
            })
            .collect();
        memberships.sort_by(|a, b| a.workspace_id.cmp(&b.workspace_id));
        Ok(memberships)
    }

    async fn add_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<WorkspaceMember, DatabaseError> {
        // Held across the insert so the workspace cannot vanish in between
        let workspaces = self.workspaces.read().await;
        if !workspaces.contains_key(workspace_id) {
            return Err(DatabaseError::QueryError(format!(
                "workspace '{}' does not exist",
                workspace_id
            )));
        }
        self.members
            .write()
            .await
            .insert((workspace_id.to_string(), user_id.to_string()), role);
        drop(workspaces);
        Ok(WorkspaceMember {
            workspace_id: workspace_id.to_string(),
            user_id: user_id.to_string(),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_text(content: &str) -> NewText {
        NewText {
            title: "Sans titre".to_string(),
            content: content.to_string(),
            created_by: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn delete_is_scoped_to_workspace() {
        let repo = MemoryTextRepository::new();
        let text = repo.create("ws-a", new_text("belongs to a")).await.unwrap();
        let id = text.id.to_string();

        assert!(!repo.delete(&id, "ws-b").await.unwrap());
        assert_eq!(repo.count("ws-a").await.unwrap(), 1);

        assert!(repo.delete(&id, "ws-a").await.unwrap());
        assert_eq!(repo.count("ws-a").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reads_never_cross_workspaces() {
        let repo = MemoryTextRepository::new();
        let a = repo.create("ws-a", new_text("a")).await.unwrap();
        repo.create("ws-b", new_text("b")).await.unwrap();

        let listed = repo.list_by_workspace("ws-a").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, a.id);
        assert!(repo.get_by_id(&a.id.to_string(), "ws-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let repo = MemoryTextRepository::new();
        let text = repo.create("ws-a", new_text("original")).await.unwrap();

        let updated = repo
            .update(
                &text.id.to_string(),
                "ws-a",
                TextChanges {
                    title: Some("Renamed".to_string()),
                    content: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.content, "original");
        assert!(updated.updated_at >= text.updated_at);

        let missing = repo
            .update(&text.id.to_string(), "ws-b", TextChanges::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn malformed_ids_match_nothing() {
        let repo = MemoryCommentRepository::new();
        repo.create(
            "ws-a",
            NewComment {
                text: "hi".to_string(),
                author_id: "u1".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(!repo.delete("nonexistent", "ws-a").await.unwrap());
        assert_eq!(repo.list_by_workspace("ws-a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn demo_seed_has_both_roles() {
        let repo = MemoryWorkspaceRepository::seeded_demo().await.unwrap();
        let memberships = repo.list_memberships_for_user(DEMO_USER_ID).await.unwrap();
        assert_eq!(memberships.len(), 2);
        assert_eq!(memberships[0].workspace_id, DEMO_ADMIN_WORKSPACE);
        assert_eq!(memberships[0].role, WorkspaceRole::Admin);
        assert_eq!(memberships[1].role, WorkspaceRole::Editor);
    }

    #[tokio::test]
    async fn members_require_an_existing_workspace() {
        let repo = MemoryWorkspaceRepository::new();
        assert!(repo.add_member("ghost", "u1", WorkspaceRole::Editor).await.is_err());
    }

    #[tokio::test]
    async fn create_with_owner_is_all_or_nothing() {
        let repo = MemoryWorkspaceRepository::new();
        let workspace = Workspace {
            id: "ws".to_string(),
            name: "Team".to_string(),
            color: None,
            owner_id: "owner".to_string(),
        };

        let (created, owner) = repo.create_with_owner(workspace.clone()).await.unwrap();
        assert_eq!(created.id, "ws");
        assert_eq!(owner.role, WorkspaceRole::Admin);
        assert_eq!(
            repo.find_member("ws", "owner").await.unwrap().map(|m| m.role),
            Some(WorkspaceRole::Admin)
        );

        let duplicate = Workspace {
            owner_id: "intruder".to_string(),
            ..workspace
        };
        assert!(repo.create_with_owner(duplicate).await.is_err());
        assert!(repo.find_member("ws", "intruder").await.unwrap().is_none());
        assert_eq!(repo.find_by_id("ws").await.unwrap().unwrap().owner_id, "owner");
    }
}
