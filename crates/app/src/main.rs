mod actions;
mod cli;
mod config;
mod http;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::ConfigError;
use crate::http::HttpError;
use crate::wiring::WiringError;
use threadline_infra::db::{DbPoolError, run_migrations};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let config = config::AppConfig::from_env()?;
    if cli.migrate_only && config.database_url.is_none() {
        return Err(AppError::InvalidCli(
            "migrate-only requires THREADLINE_DATABASE_URL".to_string(),
        ));
    }
    let state = wiring::build_state(config)?;

    match state.db.as_ref() {
        Some(db) if !cli.skip_migrations => {
            let pool = db.pool().await?;
            run_migrations(pool).await?;
        }
        Some(_) => warn!("skipping database migrations"),
        None => {}
    }
    if cli.migrate_only {
        info!("migrations applied; exiting");
        return Ok(());
    }

    let addr = state.config.http_addr;
    http::serve(addr, state, shutdown_signal()).await?;
    info!("http server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
