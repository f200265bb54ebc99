use std::sync::Arc;

use crate::config::AppConfig;
use threadline_core::revalidate::PathRevalidator;
use threadline_core::store::ThreadStore;
use threadline_infra::db::DbConnector;
use threadline_infra::revalidate::StalePaths;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ThreadStore>,
    pub revalidator: Arc<dyn PathRevalidator>,
    pub db: Option<Arc<DbConnector>>,
    /// Set when revalidation is tracked in-process instead of via webhook.
    pub stale_paths: Option<Arc<StalePaths>>,
}
