use serde::Deserialize;
use tracing::debug;

use super::{Action, ActionError, ThreadsError, populate};
use threadline_core::domain::threads::FeedPage;
use threadline_core::store::ThreadStore;
use threadline_core::types::page::PageRequest;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchPostsParams {
    #[serde(alias = "pageNumber")]
    pub page_number: Option<i64>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
}

/// Returns one page of top-level posts, newest first.
pub async fn run(
    store: &dyn ThreadStore,
    params: FetchPostsParams,
    max_page_size: u32,
) -> Result<FeedPage, ActionError> {
    fetch(store, params, max_page_size)
        .await
        .map_err(ActionError::wrap(Action::FetchPosts))
}

async fn fetch(
    store: &dyn ThreadStore,
    params: FetchPostsParams,
    max_page_size: u32,
) -> Result<FeedPage, ThreadsError> {
    let page = PageRequest::new(params.page_number, params.page_size, max_page_size)?;
    let threads = store.list_top_level(page.skip(), page.limit()).await?;
    let total = store.count_top_level().await?;
    let is_next = page.is_next(total, threads.len());
    let posts = populate::feed_posts(store, threads).await?;
    debug!(
        page = page.number,
        size = page.size,
        returned = posts.len(),
        total,
        is_next,
        "feed page fetched"
    );
    Ok(FeedPage { posts, is_next })
}

#[cfg(test)]
mod tests {
    use super::{FetchPostsParams, run};
    use crate::actions::ThreadsError;
    use crate::actions::testing::{store_with, user};
    use threadline_core::domain::threads::NewThread;
    use threadline_core::store::ThreadStore;
    use threadline_infra::memory::MemoryThreadStore;

    const MAX: u32 = 100;

    fn page(number: i64, size: i64) -> FetchPostsParams {
        FetchPostsParams {
            page_number: Some(number),
            page_size: Some(size),
        }
    }

    async fn seeded(posts: usize) -> MemoryThreadStore {
        let ann = user("Ann");
        let store = store_with(&[&ann]).await;
        for idx in 0..posts {
            let post = store
                .insert_thread(NewThread::new(&format!("post {idx}"), ann.id).unwrap())
                .await
                .unwrap();
            store
                .insert_comment(post.id, NewThread::new("reply", ann.id).unwrap())
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn first_page_of_twenty_five_has_next() {
        let store = seeded(25).await;
        let feed = run(&store, page(1, 20), MAX).await.unwrap();
        assert_eq!(feed.posts.len(), 20);
        assert!(feed.is_next);
    }

    #[tokio::test]
    async fn second_page_of_twenty_five_is_last() {
        let store = seeded(25).await;
        let feed = run(&store, page(2, 20), MAX).await.unwrap();
        assert_eq!(feed.posts.len(), 5);
        assert!(!feed.is_next);
    }

    #[tokio::test]
    async fn defaults_apply_when_params_missing() {
        let store = seeded(21).await;
        let feed = run(&store, FetchPostsParams::default(), MAX).await.unwrap();
        assert_eq!(feed.posts.len(), 20);
        assert!(feed.is_next);
    }

    #[tokio::test]
    async fn never_returns_comments() {
        let store = seeded(3).await;
        let feed = run(&store, page(1, 50), MAX).await.unwrap();
        assert_eq!(feed.posts.len(), 3);
        assert!(feed.posts.iter().all(|post| post.parent_id.is_none()));
    }

    #[tokio::test]
    async fn newest_first_with_populated_children() {
        let store = seeded(2).await;
        let feed = run(&store, page(1, 20), MAX).await.unwrap();
        assert_eq!(feed.posts[0].text, "post 1");
        assert_eq!(feed.posts[1].text, "post 0");
        let child = &feed.posts[0].children[0];
        assert_eq!(child.text, "reply");
        assert_eq!(child.author.name, "Ann");
        assert_eq!(child.parent_id, Some(feed.posts[0].id));
        assert_eq!(feed.posts[0].author.name, "Ann");
    }

    #[tokio::test]
    async fn page_past_end_is_empty() {
        let store = seeded(5).await;
        let feed = run(&store, page(3, 5), MAX).await.unwrap();
        assert!(feed.posts.is_empty());
        assert!(!feed.is_next);
    }

    #[tokio::test]
    async fn rejects_non_positive_page() {
        let store = seeded(1).await;
        let err = run(&store, page(0, 20), MAX).await.unwrap_err();
        assert!(matches!(err.source, ThreadsError::Validation(_)));
        assert!(err.to_string().starts_with("error fetching posts: "));
    }
}
