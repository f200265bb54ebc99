use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::id::{CommunityId, ThreadId, UserId};

pub const MAX_TEXT_LEN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub image: Option<String>,
    pub threads: Vec<ThreadId>,
}

/// A post or a comment; comments carry a `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thread {
    pub id: ThreadId,
    pub text: String,
    pub author: UserId,
    pub parent_id: Option<ThreadId>,
    pub community_id: Option<CommunityId>,
    pub children: Vec<ThreadId>,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub name: String,
    pub image: Option<String>,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        AuthorSummary {
            id: user.id,
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// A thread with its author expanded to `A` and its children expanded to `C`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostNode<A, C> {
    pub id: ThreadId,
    pub text: String,
    pub author: A,
    pub parent_id: Option<ThreadId>,
    pub community_id: Option<CommunityId>,
    pub created_at: DateTime<Utc>,
    pub children: Vec<C>,
}

impl<A, C> PostNode<A, C> {
    pub fn from_thread(thread: Thread, author: A, children: Vec<C>) -> Self {
        PostNode {
            id: thread.id,
            text: thread.text,
            author,
            parent_id: thread.parent_id,
            community_id: thread.community_id,
            created_at: thread.created_at,
            children,
        }
    }
}

pub type ChildPost = PostNode<AuthorSummary, ThreadId>;
pub type FeedPost = PostNode<User, ChildPost>;

pub type CommentLeaf = PostNode<AuthorSummary, ThreadId>;
pub type CommentNode = PostNode<AuthorSummary, CommentLeaf>;
pub type ThreadDetail = PostNode<AuthorSummary, CommentNode>;

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub is_next: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewThread {
    pub text: String,
    pub author: UserId,
    pub community_id: Option<CommunityId>,
}

impl NewThread {
    pub fn new(text: &str, author: UserId) -> Result<Self, CoreError> {
        let text = normalize_text(text)?;
        Ok(NewThread {
            text,
            author,
            community_id: None,
        })
    }
}

fn normalize_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidText("text is empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(CoreError::InvalidText(format!(
            "text exceeds {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
