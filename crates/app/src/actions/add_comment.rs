use serde::Deserialize;
use tracing::info;

use super::{Action, ActionError, ThreadsError, revalidate};
use threadline_core::domain::threads::{NewThread, Thread};
use threadline_core::revalidate::PathRevalidator;
use threadline_core::store::ThreadStore;
use threadline_core::types::id::{ThreadId, UserId};
use threadline_core::types::path::RenderPath;

#[derive(Debug, Clone, Deserialize)]
pub struct AddCommentParams {
    pub text: String,
    pub user_id: String,
    pub path: String,
}

/// Adds a comment under `thread_id` and marks `path` stale.
pub async fn run(
    store: &dyn ThreadStore,
    revalidator: &dyn PathRevalidator,
    thread_id: &str,
    params: AddCommentParams,
) -> Result<Thread, ActionError> {
    add(store, revalidator, thread_id, params)
        .await
        .map_err(ActionError::wrap(Action::AddComment))
}

async fn add(
    store: &dyn ThreadStore,
    revalidator: &dyn PathRevalidator,
    thread_id: &str,
    params: AddCommentParams,
) -> Result<Thread, ThreadsError> {
    let parent = ThreadId::try_from(thread_id)?;
    let author = UserId::try_from(params.user_id.as_str())?;
    let path = RenderPath::try_from(params.path.as_str())?;
    let new = NewThread::new(&params.text, author)?;

    let comment = store.insert_comment(parent, new).await?;
    info!(thread_id = %comment.id, parent_id = %parent, author = %author, "comment added");
    revalidate(revalidator, &path).await;
    Ok(comment)
}
