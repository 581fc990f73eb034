use anyhow::bail;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::Workspace;
use crate::database::postgres::PgWorkspaceRepository;
use crate::database::{DatabaseManager, WorkspaceRepository};
use crate::types::WorkspaceRole;
use crate::validation::validate_optional_hex_color;

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    #[command(about = "Create a workspace; the owner becomes its admin")]
    Create {
        #[arg(long, help = "Workspace id")]
        id: String,

        #[arg(long, help = "Display name")]
        name: String,

        #[arg(long, help = "Owner user id")]
        owner: String,

        #[arg(long, help = "Color as #RRGGBB")]
        color: Option<String>,
    },

    #[command(about = "Add a member or change their role")]
    AddMember {
        #[arg(long, help = "Workspace id")]
        workspace: String,

        #[arg(long, help = "User id")]
        user: String,

        #[arg(long, help = "Role: admin or editor")]
        role: WorkspaceRole,
    },
}

pub async fn handle(cmd: WorkspaceCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    // Validate before touching the database
    if let WorkspaceCommands::Create { color, .. } = &cmd {
        if !validate_optional_hex_color(color.as_deref()) {
            bail!("Invalid color '{}', expected #RRGGBB", color.as_deref().unwrap_or_default());
        }
    }

    let manager = DatabaseManager::connect(&config.database).await?;
    let repo = PgWorkspaceRepository::new(manager.pool());
    let result = execute(cmd, &repo, output_format).await;
    manager.close().await;
    result
}

async fn execute(
    cmd: WorkspaceCommands,
    repo: &dyn WorkspaceRepository,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        WorkspaceCommands::Create { id, name, owner, color } => {
            if repo.find_by_id(&id).await?.is_some() {
                bail!("Workspace '{}' already exists", id);
            }

            let (workspace, owner) = repo
                .create_with_owner(Workspace {
                    id,
                    name,
                    color,
                    owner_id: owner,
                })
                .await?;

            output_success(
                output_format,
                &format!("Workspace '{}' created", workspace.id),
                Some(json!({ "workspace": workspace, "owner": owner })),
            )
        }
        WorkspaceCommands::AddMember { workspace, user, role } => {
            if repo.find_by_id(&workspace).await?.is_none() {
                bail!("Workspace '{}' not found", workspace);
            }

            let member = repo.add_member(&workspace, &user, role).await?;
            output_success(
                output_format,
                &format!("{} is now {} of '{}'", member.user_id, member.role, member.workspace_id),
                Some(json!({ "member": member })),
            )
        }
    }
}
