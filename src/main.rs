use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agentova_api::config::AppConfig;
use agentova_api::handlers;
use agentova_api::services::ServiceContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, secrets, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Starting Agentova API in {:?} mode ({:?} storage)",
        config.environment, config.server.storage
    );

    let ctx = ServiceContext::from_config(&config)
        .await
        .context("failed to initialize storage")?;
    let app = handlers::app(ctx, &config.security.cors_origins);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Agentova API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
