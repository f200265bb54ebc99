use async_trait::async_trait;
use thiserror::Error;

use crate::domain::threads::{NewThread, Thread, User};
use crate::types::id::{ThreadId, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn user_not_found(id: UserId) -> Self {
        StoreError::NotFound {
            entity: "user",
            id: id.to_string(),
        }
    }

    pub fn thread_not_found(id: ThreadId) -> Self {
        StoreError::NotFound {
            entity: "thread",
            id: id.to_string(),
        }
    }
}

/// Persistence for users and threads.
///
/// Both insert methods create the thread and link it to its owner as a single
/// unit: if the owner is missing or the link fails, nothing is persisted.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Inserts a top-level thread and appends it to the author's `threads`.
    async fn insert_thread(&self, new: NewThread) -> Result<Thread, StoreError>;

    /// Inserts a comment under `parent` and appends it to the parent's `children`.
    async fn insert_comment(&self, parent: ThreadId, new: NewThread)
        -> Result<Thread, StoreError>;

    async fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, StoreError>;

    /// Returns the threads in the order of `ids`, skipping unknown ids.
    async fn find_threads(&self, ids: &[ThreadId]) -> Result<Vec<Thread>, StoreError>;

    /// Returns the users in the order of `ids`, skipping unknown ids.
    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    /// Top-level threads, newest first.
    async fn list_top_level(&self, skip: u64, limit: u64) -> Result<Vec<Thread>, StoreError>;

    async fn count_top_level(&self) -> Result<u64, StoreError>;
}
