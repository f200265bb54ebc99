pub mod add_comment;
pub mod create_thread;
pub mod fetch_posts;
pub mod fetch_thread;
mod populate;

use std::fmt;

use thiserror::Error;
use tracing::warn;

use threadline_core::error::CoreError;
use threadline_core::revalidate::PathRevalidator;
use threadline_core::store::StoreError;
use threadline_core::types::path::RenderPath;

#[derive(Debug, Error)]
pub enum ThreadsError {
    #[error("{0}")]
    Validation(#[from] CoreError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Persistence(String),
}

impl From<StoreError> for ThreadsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ThreadsError::NotFound { entity, id },
            StoreError::Backend(message) => ThreadsError::Persistence(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateThread,
    AddComment,
    FetchPosts,
    FetchThread,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::CreateThread => "error creating thread",
            Action::AddComment => "error adding comment",
            Action::FetchPosts => "error fetching posts",
            Action::FetchThread => "error fetching thread",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
#[error("{action}: {source}")]
pub struct ActionError {
    pub action: Action,
    #[source]
    pub source: ThreadsError,
}

impl ActionError {
    fn wrap(action: Action) -> impl FnOnce(ThreadsError) -> ActionError {
        move |source| ActionError { action, source }
    }

    /// A request the transport layer could not decode into action input.
    pub fn rejected(action: Action, reason: impl fmt::Display) -> Self {
        ActionError {
            action,
            source: ThreadsError::Validation(CoreError::InvalidRequest(reason.to_string())),
        }
    }
}

/// Signals the render cache after a committed write. Failures are logged, not returned.
async fn revalidate(revalidator: &dyn PathRevalidator, path: &RenderPath) {
    if let Err(err) = revalidator.revalidate(path).await {
        warn!(error = %err, %path, "path revalidation failed");
    }
}


#[cfg(test)]
mod tests {
    use super::{Action, ActionError, ThreadsError};
    use threadline_core::store::StoreError;

    #[test]
    fn action_error_prefixes_source_text() {
        let err = ActionError {
            action: Action::CreateThread,
            source: ThreadsError::from(StoreError::Backend("connection reset".to_string())),
        };
        assert_eq!(err.to_string(), "error creating thread: connection reset");
    }

    #[test]
    fn store_not_found_keeps_its_kind() {
        let err = ThreadsError::from(StoreError::NotFound {
            entity: "thread",
            id: "abc".to_string(),
        });
        assert!(matches!(err, ThreadsError::NotFound { entity: "thread", .. }));
    }
}
