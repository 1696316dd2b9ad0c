//! # Bank Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Create the ledger and payment services
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_hex::inbound::HttpServer;
use bank_repo::{BcryptVerifier, RandomIdentifierGenerator, build_repo};

use config::{Config, LogFormat};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,bank_app=debug,bank_hex=debug,bank_repo=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("Starting bank server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let verifier = BcryptVerifier::new(config.secrets)?;

    let server = HttpServer::new(
        Arc::new(repo),
        verifier,
        RandomIdentifierGenerator::default(),
        config.admin_name,
    );
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;
    Ok(())
}
