pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "agentova")]
#[command(about = "Agentova CLI - tokens, schema and workspace administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint identity and workspace tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Database schema management")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Workspace and membership management")]
    Workspace {
        #[command(subcommand)]
        cmd: commands::workspace::WorkspaceCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, &config, output_format),
        Commands::Db { cmd } => commands::db::handle(cmd, &config, output_format).await,
        Commands::Workspace { cmd } => commands::workspace::handle(cmd, &config, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkspaceRole;

    #[test]
    fn parses_workspace_token_command() {
        let cli = Cli::try_parse_from([
            "agentova", "--json", "token", "workspace", "--user", "u1", "--workspace", "ws", "--role", "admin",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Token {
                cmd: commands::token::TokenCommands::Workspace { user, workspace, role },
            } => {
                assert_eq!(user, "u1");
                assert_eq!(workspace, "ws");
                assert_eq!(role, WorkspaceRole::Admin);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn rejects_unknown_roles() {
        assert!(Cli::try_parse_from([
            "agentova", "workspace", "add-member", "--workspace", "ws", "--user", "u1", "--role", "owner",
        ])
        .is_err());
    }
}
