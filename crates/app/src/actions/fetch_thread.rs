use tracing::debug;

use super::{Action, ActionError, ThreadsError, populate};
use threadline_core::domain::threads::ThreadDetail;
use threadline_core::store::ThreadStore;
use threadline_core::types::id::ThreadId;

/// Loads a thread with two levels of comments. An unknown id yields `None`.
pub async fn run(store: &dyn ThreadStore, id: &str) -> Result<Option<ThreadDetail>, ActionError> {
    fetch(store, id)
        .await
        .map_err(ActionError::wrap(Action::FetchThread))
}

async fn fetch(store: &dyn ThreadStore, id: &str) -> Result<Option<ThreadDetail>, ThreadsError> {
    let id = ThreadId::try_from(id)?;
    let Some(thread) = store.find_thread(id).await? else {
        debug!(thread_id = %id, "thread not found");
        return Ok(None);
    };
    Ok(Some(populate::thread_detail(store, thread).await?))
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::actions::ThreadsError;
    use crate::actions::testing::{store_with, user};
    use threadline_core::domain::threads::NewThread;
    use threadline_core::store::ThreadStore;
    use threadline_core::types::id::ThreadId;

    #[tokio::test]
    async fn unknown_id_is_empty_not_error() {
        let store = store_with(&[]).await;
        let found = run(&store, &ThreadId::new().to_string()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn malformed_id_is_validation_error() {
        let store = store_with(&[]).await;
        let err = run(&store, "nope").await.unwrap_err();
        assert!(matches!(err.source, ThreadsError::Validation(_)));
        assert!(err.to_string().starts_with("error fetching thread: "));
    }

    #[tokio::test]
    async fn populates_two_comment_levels() {
        let ann = user("Ann");
        let bob = user("Bob");
        let cat = user("Cat");
        let store = store_with(&[&ann, &bob, &cat]).await;
        let root = store
            .insert_thread(NewThread::new("root", ann.id).unwrap())
            .await
            .unwrap();
        let reply = store
            .insert_comment(root.id, NewThread::new("reply", bob.id).unwrap())
            .await
            .unwrap();
        let nested = store
            .insert_comment(reply.id, NewThread::new("nested", cat.id).unwrap())
            .await
            .unwrap();
        let deepest = store
            .insert_comment(nested.id, NewThread::new("deepest", ann.id).unwrap())
            .await
            .unwrap();

        let detail = run(&store, &root.id.to_string()).await.unwrap().unwrap();

        assert_eq!(detail.author.name, "Ann");
        assert_eq!(detail.children.len(), 1);
        let first = &detail.children[0];
        assert_eq!(first.id, reply.id);
        assert_eq!(first.author.name, "Bob");
        assert_eq!(first.children.len(), 1);
        let second = &first.children[0];
        assert_eq!(second.id, nested.id);
        assert_eq!(second.author.name, "Cat");
        assert_eq!(second.author.image, cat.image);
        assert_eq!(second.children, vec![deepest.id]);
    }

    #[tokio::test]
    async fn comment_can_be_fetched_directly() {
        let ann = user("Ann");
        let store = store_with(&[&ann]).await;
        let root = store
            .insert_thread(NewThread::new("root", ann.id).unwrap())
            .await
            .unwrap();
        let reply = store
            .insert_comment(root.id, NewThread::new("reply", ann.id).unwrap())
            .await
            .unwrap();

        let detail = run(&store, &reply.id.to_string()).await.unwrap().unwrap();

        assert_eq!(detail.parent_id, Some(root.id));
        assert!(detail.children.is_empty());
    }
}
