use std::collections::{HashMap, HashSet};

use threadline_core::domain::threads::{
    AuthorSummary, ChildPost, CommentLeaf, CommentNode, FeedPost, PostNode, Thread, ThreadDetail,
    User,
};
use threadline_core::store::{StoreError, ThreadStore};
use threadline_core::types::id::{ThreadId, UserId};

/// Expands feed posts: full author, plus each child with an author summary.
pub async fn feed_posts(
    store: &dyn ThreadStore,
    posts: Vec<Thread>,
) -> Result<Vec<FeedPost>, StoreError> {
    let child_ids: Vec<ThreadId> = posts
        .iter()
        .flat_map(|post| post.children.iter().copied())
        .collect();
    let children = store.find_threads(&child_ids).await?;
    let users = load_users(store, posts.iter().chain(children.iter())).await?;
    let mut children_by_id: HashMap<ThreadId, Thread> = children
        .into_iter()
        .map(|child| (child.id, child))
        .collect();

    let mut result = Vec::with_capacity(posts.len());
    for post in posts {
        let author = lookup(&users, post.author)?.clone();
        let mut expanded = Vec::with_capacity(post.children.len());
        for child_id in &post.children {
            let Some(child) = children_by_id.remove(child_id) else {
                continue;
            };
            let summary = AuthorSummary::from(lookup(&users, child.author)?);
            let grandchildren = child.children.clone();
            expanded.push(ChildPost::from_thread(child, summary, grandchildren));
        }
        result.push(PostNode::from_thread(post, author, expanded));
    }
    Ok(result)
}

/// Expands a thread two comment levels deep; the third level stays as ids.
pub async fn thread_detail(
    store: &dyn ThreadStore,
    thread: Thread,
) -> Result<ThreadDetail, StoreError> {
    let children = store.find_threads(&thread.children).await?;
    let grandchild_ids: Vec<ThreadId> = children
        .iter()
        .flat_map(|child| child.children.iter().copied())
        .collect();
    let grandchildren = store.find_threads(&grandchild_ids).await?;
    let users = load_users(
        store,
        std::iter::once(&thread)
            .chain(children.iter())
            .chain(grandchildren.iter()),
    )
    .await?;
    let mut grandchildren_by_id: HashMap<ThreadId, Thread> = grandchildren
        .into_iter()
        .map(|grandchild| (grandchild.id, grandchild))
        .collect();

    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        let mut leaves = Vec::with_capacity(child.children.len());
        for leaf_id in &child.children {
            let Some(leaf) = grandchildren_by_id.remove(leaf_id) else {
                continue;
            };
            let summary = AuthorSummary::from(lookup(&users, leaf.author)?);
            let deeper = leaf.children.clone();
            leaves.push(CommentLeaf::from_thread(leaf, summary, deeper));
        }
        let summary = AuthorSummary::from(lookup(&users, child.author)?);
        nodes.push(CommentNode::from_thread(child, summary, leaves));
    }
    let summary = AuthorSummary::from(lookup(&users, thread.author)?);
    Ok(ThreadDetail::from_thread(thread, summary, nodes))
}

async fn load_users<'a>(
    store: &dyn ThreadStore,
    threads: impl Iterator<Item = &'a Thread>,
) -> Result<HashMap<UserId, User>, StoreError> {
    let mut seen = HashSet::new();
    let ids: Vec<UserId> = threads
        .map(|thread| thread.author)
        .filter(|id| seen.insert(*id))
        .collect();
    let users = store.find_users(&ids).await?;
    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}

// A thread whose author row is gone is a broken reference, not an empty result.
fn lookup(users: &HashMap<UserId, User>, id: UserId) -> Result<&User, StoreError> {
    users.get(&id).ok_or_else(|| StoreError::user_not_found(id))
}
