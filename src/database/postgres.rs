use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Comment, NewComment, NewText, Text, TextChanges, Workspace, WorkspaceMember};
use crate::database::repository::{CommentRepository, TextRepository, WorkspaceRepository};
use crate::types::WorkspaceRole;

const TEXT_COLUMNS: &str = "id, workspace_id, title, content, created_by, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, workspace_id, text, author_id, created_at";

/// Ids arrive as strings from the client; anything that is not a UUID
/// cannot match a row.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id.trim()).ok()
}

pub struct PgTextRepository {
    pool: PgPool,
}

impl PgTextRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TextRepository for PgTextRepository {
    async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Text>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM texts WHERE workspace_id = $1 ORDER BY created_at DESC",
            TEXT_COLUMNS
        );
        let texts = sqlx::query_as::<_, Text>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(texts)
    }

    async fn get_by_id(&self, id: &str, workspace_id: &str) -> Result<Option<Text>, DatabaseError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM texts WHERE id = $1 AND workspace_id = $2",
            TEXT_COLUMNS
        );
        let text = sqlx::query_as::<_, Text>(&sql)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(text)
    }

    async fn create(&self, workspace_id: &str, data: NewText) -> Result<Text, DatabaseError> {
        let sql = format!(
            "INSERT INTO texts (workspace_id, title, content, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) RETURNING {}",
            TEXT_COLUMNS
        );
        let text = sqlx::query_as::<_, Text>(&sql)
            .bind(workspace_id)
            .bind(&data.title)
            .bind(&data.content)
            .bind(&data.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(text)
    }

    async fn update(
        &self,
        id: &str,
        workspace_id: &str,
        changes: TextChanges,
    ) -> Result<Option<Text>, DatabaseError> {
        if changes.is_empty() {
            return self.get_by_id(id, workspace_id).await;
        }
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let sql = format!(
            "UPDATE texts SET title = COALESCE($1, title), content = COALESCE($2, content), updated_at = NOW() \
             WHERE id = $3 AND workspace_id = $4 RETURNING {}",
            TEXT_COLUMNS
        );
        let text = sqlx::query_as::<_, Text>(&sql)
            .bind(changes.title)
            .bind(changes.content)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(text)
    }

    async fn delete(&self, id: &str, workspace_id: &str) -> Result<bool, DatabaseError> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM texts WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, workspace_id: &str) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM texts WHERE workspace_id = $1")
            .bind(workspace_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Comment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM comments WHERE workspace_id = $1 ORDER BY created_at DESC",
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn create(&self, workspace_id: &str, data: NewComment) -> Result<Comment, DatabaseError> {
        let sql = format!(
            "INSERT INTO comments (workspace_id, text, author_id, created_at) \
             VALUES ($1, $2, $3, NOW()) RETURNING {}",
            COMMENT_COLUMNS
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(workspace_id)
            .bind(&data.text)
            .bind(&data.author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn delete(&self, id: &str, workspace_id: &str) -> Result<bool, DatabaseError> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgWorkspaceRepository {
    pool: PgPool,
}

impl PgWorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn member_from_row(row: (String, String, String)) -> Result<WorkspaceMember, DatabaseError> {
        let (workspace_id, user_id, role) = row;
        let role = role
            .parse::<WorkspaceRole>()
            .map_err(|_| DatabaseError::InvalidColumn {
                column: "workspace_members.role",
                value: role.clone(),
            })?;
        Ok(WorkspaceMember {
            workspace_id,
            user_id,
            role,
        })
    }
}

const INSERT_WORKSPACE: &str = "INSERT INTO workspaces (id, name, color, owner_id) VALUES ($1, $2, $3, $4) \
     RETURNING id, name, color, owner_id";

const UPSERT_MEMBER: &str = "INSERT INTO workspace_members (workspace_id, user_id, role) VALUES ($1, $2, $3) \
     ON CONFLICT (workspace_id, user_id) DO UPDATE SET role = EXCLUDED.role \
     RETURNING workspace_id, user_id, role";

#[async_trait]
impl WorkspaceRepository for PgWorkspaceRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>, DatabaseError> {
        let workspace = sqlx::query_as::<_, Workspace>(
            "SELECT id, name, color, owner_id FROM workspaces WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(workspace)
    }

    async fn create(&self, workspace: Workspace) -> Result<Workspace, DatabaseError> {
        let workspace = sqlx::query_as::<_, Workspace>(INSERT_WORKSPACE)
            .bind(&workspace.id)
            .bind(&workspace.name)
            .bind(&workspace.color)
            .bind(&workspace.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(workspace)
    }

    async fn create_with_owner(&self, workspace: Workspace) -> Result<(Workspace, WorkspaceMember), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let workspace = sqlx::query_as::<_, Workspace>(INSERT_WORKSPACE)
            .bind(&workspace.id)
            .bind(&workspace.name)
            .bind(&workspace.color)
            .bind(&workspace.owner_id)
            .fetch_one(&mut *tx)
            .await?;

        let row: (String, String, String) = sqlx::query_as(UPSERT_MEMBER)
            .bind(&workspace.id)
            .bind(&workspace.owner_id)
            .bind(WorkspaceRole::Admin.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let owner = Self::member_from_row(row)?;

        // Dropping `tx` on any early return above rolls back
        tx.commit().await?;
        Ok((workspace, owner))
    }

    async fn find_member(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<WorkspaceMember>, DatabaseError> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            "SELECT workspace_id, user_id, role FROM workspace_members \
             WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::member_from_row).transpose()
    }

    async fn list_memberships_for_user(&self, user_id: &str) -> Result<Vec<WorkspaceMember>, DatabaseError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT workspace_id, user_id, role FROM workspace_members \
             WHERE user_id = $1 ORDER BY workspace_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::member_from_row).collect()
    }

    async fn add_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<WorkspaceMember, DatabaseError> {
        let row: (String, String, String) = sqlx::query_as(UPSERT_MEMBER)
            .bind(workspace_id)
            .bind(user_id)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;

        Self::member_from_row(row)
    }
}
