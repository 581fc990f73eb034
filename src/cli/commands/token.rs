use clap::Subcommand;

use crate::auth::{sign_workspace_token, IdentityProvider};
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::types::WorkspaceRole;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint an identity token for a user")]
    Identity {
        #[arg(long, help = "User id")]
        user: String,
    },

    #[command(about = "Mint a workspace token")]
    Workspace {
        #[arg(long, help = "User id")]
        user: String,

        #[arg(long, help = "Workspace id")]
        workspace: String,

        #[arg(long, help = "Role: admin or editor")]
        role: WorkspaceRole,
    },
}

pub fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config.security;

    match cmd {
        TokenCommands::Identity { user } => {
            let token = IdentityProvider::new(security.identity_secret.clone(), security.identity_token_expiry_hours)
                .issue(&user)?;
            output_value(output_format, "token", &token)
        }
        TokenCommands::Workspace { user, workspace, role } => {
            // Membership is checked on use, not at signing time
            let token = sign_workspace_token(
                &security.workspace_secret,
                security.workspace_token_expiry_hours,
                &user,
                &workspace,
                role,
            )?;
            output_value(output_format, "token", &token)
        }
    }
}
