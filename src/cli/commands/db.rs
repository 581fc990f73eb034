use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables and indexes in DATABASE_URL")]
    Init,
}

pub async fn handle(cmd: DbCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => {
            let manager = DatabaseManager::connect(&config.database).await?;
            let applied = manager.apply_schema().await?;
            manager.close().await;

            output_success(
                output_format,
                &format!("Schema applied ({} statements)", applied),
                Some(json!({ "statements": applied })),
            )
        }
    }
}
