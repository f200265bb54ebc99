use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use threadline_core::revalidate::{PathRevalidator, RevalidateError};
use threadline_core::types::path::RenderPath;

pub const DEFAULT_CAPACITY: usize = 10_000;

/// Paths whose rendered output must be recomputed on next access.
///
/// Holds at most `capacity` distinct paths. Marks beyond that set the
/// overflow flag instead, which tells the consumer to treat every path as
/// stale. Both are cleared by [`StalePaths::take`].
#[derive(Debug)]
pub struct StalePaths {
    capacity: usize,
    state: RwLock<StaleState>,
}

#[derive(Debug, Default)]
struct StaleState {
    paths: HashSet<String>,
    overflowed: bool,
}

/// What a consumer receives when draining the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleBatch {
    pub paths: Vec<String>,
    pub overflowed: bool,
}

impl Default for StalePaths {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl StalePaths {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            state: RwLock::new(StaleState::default()),
        }
    }

    /// Returns true when the path was not already tracked.
    pub async fn mark(&self, path: &RenderPath) -> bool {
        let mut state = self.state.write().await;
        if state.paths.contains(path.as_str()) {
            return false;
        }
        if state.paths.len() >= self.capacity {
            if !state.overflowed {
                warn!(capacity = self.capacity, "stale path set full; marking everything stale");
            }
            state.overflowed = true;
            return false;
        }
        state.paths.insert(path.as_str().to_string())
    }

    pub async fn is_stale(&self, path: &str) -> bool {
        let state = self.state.read().await;
        state.overflowed || state.paths.contains(path)
    }

    /// Drains every tracked path, sorted, and resets the overflow flag.
    pub async fn take(&self) -> StaleBatch {
        let mut state = self.state.write().await;
        let mut paths: Vec<String> = state.paths.drain().collect();
        paths.sort();
        let overflowed = std::mem::take(&mut state.overflowed);
        StaleBatch { paths, overflowed }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.paths.len()
    }
}

#[async_trait]
impl PathRevalidator for StalePaths {
    async fn revalidate(&self, path: &RenderPath) -> Result<(), RevalidateError> {
        if self.mark(path).await {
            debug!(%path, "path marked stale");
        }
        Ok(())
    }
}
