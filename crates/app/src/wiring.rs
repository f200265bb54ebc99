use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::state::AppState;
use threadline_core::revalidate::PathRevalidator;
use threadline_core::store::ThreadStore;
use threadline_infra::db::{DbConnector, PgThreadStore};
use threadline_infra::memory::{self, MemoryThreadStore, SeedError};
use threadline_infra::revalidate::{StalePaths, WebhookRevalidator};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("seed users: {0}")]
    Seed(#[from] SeedError),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let (store, db) = match config.database_url.as_deref() {
        Some(url) => {
            let connector = Arc::new(DbConnector::new(url, config.db_max_connections));
            info!("using postgres thread store");
            if let Some(path) = config.seed_users.as_deref() {
                warn!(path = %path.display(), "seed users only apply to the in-memory store; ignored");
            }
            let store: Arc<dyn ThreadStore> = Arc::new(PgThreadStore::new(connector.clone()));
            (store, Some(connector))
        }
        None => {
            warn!("database url not configured; threads are kept in memory");
            let users = match config.seed_users.as_deref() {
                Some(path) => {
                    let users = memory::load_seed_users(path)?;
                    info!(path = %path.display(), count = users.len(), "seed users loaded");
                    users
                }
                None => {
                    warn!("no seed users configured; thread creation fails until users exist");
                    Vec::new()
                }
            };
            let store: Arc<dyn ThreadStore> = Arc::new(MemoryThreadStore::with_users(users));
            (store, None)
        }
    };
    assemble(config, store, db)
}

pub fn assemble(
    config: AppConfig,
    store: Arc<dyn ThreadStore>,
    db: Option<Arc<DbConnector>>,
) -> Result<AppState, WiringError> {
    let (revalidator, stale_paths) = match config.revalidate_url.clone() {
        Some(url) => {
            let client = Client::builder().timeout(config.request_timeout).build()?;
            info!(%url, "revalidation via webhook");
            let webhook =
                WebhookRevalidator::new(client, url, config.revalidate_secret.clone());
            let revalidator: Arc<dyn PathRevalidator> = Arc::new(webhook);
            (revalidator, None)
        }
        None => {
            let stale = Arc::new(StalePaths::with_capacity(config.stale_paths_capacity));
            let revalidator: Arc<dyn PathRevalidator> = stale.clone();
            (revalidator, Some(stale))
        }
    };
    Ok(AppState {
        config: Arc::new(config),
        store,
        revalidator,
        db,
        stale_paths,
    })
}
