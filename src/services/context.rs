use std::sync::Arc;

use tracing::info;

use crate::auth::{IdentityProvider, WorkspaceGate};
use crate::config::{AppConfig, StorageBackend};
use crate::database::memory::{MemoryCommentRepository, MemoryTextRepository, MemoryWorkspaceRepository};
use crate::database::postgres::{PgCommentRepository, PgTextRepository, PgWorkspaceRepository};
use crate::database::{CommentRepository, DatabaseError, DatabaseManager, TextRepository, WorkspaceRepository};
use crate::firewall::Firewall;

/// Everything an operation needs, built once at startup and shared by
/// reference. Cloning is cheap.
#[derive(Clone)]
pub struct ServiceContext {
    pub texts: Arc<dyn TextRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub gate: Arc<WorkspaceGate>,
    pub firewall: Arc<Firewall>,
    pub identity: Arc<IdentityProvider>,
    /// Expected `x-server-token` for internal routes
    pub server_token: Arc<str>,
}

impl ServiceContext {
    pub fn new(
        config: &AppConfig,
        texts: Arc<dyn TextRepository>,
        comments: Arc<dyn CommentRepository>,
        workspaces: Arc<dyn WorkspaceRepository>,
    ) -> Self {
        let security = &config.security;
        let gate = WorkspaceGate::new(
            security.workspace_secret.clone(),
            security.workspace_token_expiry_hours,
            workspaces.clone(),
        );

        Self {
            texts,
            comments,
            workspaces,
            gate: Arc::new(gate),
            firewall: Arc::new(Firewall::from_config(&config.firewall)),
            identity: Arc::new(IdentityProvider::new(
                security.identity_secret.clone(),
                security.identity_token_expiry_hours,
            )),
            server_token: Arc::from(security.server_token.as_str()),
        }
    }

    /// Pick the storage backend named by the configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        match config.server.storage {
            StorageBackend::Memory => {
                info!("Using in-memory storage with demo workspaces");
                Self::in_memory_demo(config).await
            }
            StorageBackend::Postgres => {
                let manager = DatabaseManager::connect(&config.database).await?;
                let pool = manager.pool();
                info!("Using PostgreSQL storage");
                Ok(Self::new(
                    config,
                    Arc::new(PgTextRepository::new(pool.clone())),
                    Arc::new(PgCommentRepository::new(pool.clone())),
                    Arc::new(PgWorkspaceRepository::new(pool)),
                ))
            }
        }
    }

    /// Empty in-memory repositories
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryTextRepository::new()),
            Arc::new(MemoryCommentRepository::new()),
            Arc::new(MemoryWorkspaceRepository::new()),
        )
    }

    /// In-memory repositories seeded with the demo user and workspaces
    pub async fn in_memory_demo(config: &AppConfig) -> Result<Self, DatabaseError> {
        let workspaces = MemoryWorkspaceRepository::seeded_demo().await?;
        Ok(Self::new(
            config,
            Arc::new(MemoryTextRepository::new()),
            Arc::new(MemoryCommentRepository::new()),
            Arc::new(workspaces),
        ))
    }

    pub fn with_firewall(mut self, firewall: Firewall) -> Self {
        self.firewall = Arc::new(firewall);
        self
    }
}
