use serde::Deserialize;
use tracing::{debug, info};

use super::{Action, ActionError, ThreadsError, revalidate};
use threadline_core::domain::threads::{NewThread, Thread};
use threadline_core::revalidate::PathRevalidator;
use threadline_core::store::ThreadStore;
use threadline_core::types::id::UserId;
use threadline_core::types::path::RenderPath;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateThreadParams {
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub community_id: Option<String>,
    pub path: String,
}

/// Creates a top-level thread, links it to its author and marks `path` stale.
///
/// Communities are not wired up yet: a supplied `community_id` is accepted but
/// the stored thread never carries one.
pub async fn run(
    store: &dyn ThreadStore,
    revalidator: &dyn PathRevalidator,
    params: CreateThreadParams,
) -> Result<Thread, ActionError> {
    create(store, revalidator, params)
        .await
        .map_err(ActionError::wrap(Action::CreateThread))
}

async fn create(
    store: &dyn ThreadStore,
    revalidator: &dyn PathRevalidator,
    params: CreateThreadParams,
) -> Result<Thread, ThreadsError> {
    let author = UserId::try_from(params.author.as_str())?;
    let path = RenderPath::try_from(params.path.as_str())?;
    let new = NewThread::new(&params.text, author)?;
    if let Some(community) = params.community_id.as_deref() {
        debug!(community, "community id ignored on thread create");
    }

    let thread = store.insert_thread(new).await?;
    info!(thread_id = %thread.id, author = %thread.author, "thread created");
    revalidate(revalidator, &path).await;
    Ok(thread)
}
