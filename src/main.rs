use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use account_deletion_api::{app, build_state, config::AppConfig};

#[derive(Parser)]
#[command(name = "account-deletion-api")]
#[command(about = "Self-service account deletion endpoint")]
#[command(version)]
struct Args {
    #[arg(long, env = "HOST", default_value = "0.0.0.0", help = "Address to bind")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3000, help = "Port to listen on")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up SUPABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting account deletion API in {:?} mode", config.environment);

    let state = build_state(&config).await.context("failed to initialise data store")?;

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
