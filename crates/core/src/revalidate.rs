use async_trait::async_trait;
use thiserror::Error;

use crate::types::path::RenderPath;

#[derive(Debug, Error)]
pub enum RevalidateError {
    #[error("revalidate request failed: {0}")]
    Request(String),
    #[error("revalidate rejected with status {0}")]
    Rejected(u16),
}

/// Marks previously rendered output for a path as stale.
#[async_trait]
pub trait PathRevalidator: Send + Sync {
    async fn revalidate(&self, path: &RenderPath) -> Result<(), RevalidateError>;
}
