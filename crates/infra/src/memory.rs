use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use threadline_core::domain::threads::{NewThread, Thread, User};
use threadline_core::store::{StoreError, ThreadStore};
use threadline_core::types::id::{ThreadId, UserId};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("read seed users: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse seed users: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One entry of the seed users file. A missing `id` gets a fresh one.
#[derive(Debug, Deserialize)]
struct SeedUser {
    #[serde(default)]
    id: Option<UserId>,
    name: String,
    username: String,
    #[serde(default)]
    image: Option<String>,
}

impl From<SeedUser> for User {
    fn from(seed: SeedUser) -> Self {
        User {
            id: seed.id.unwrap_or_default(),
            name: seed.name,
            username: seed.username,
            image: seed.image,
            threads: Vec::new(),
        }
    }
}

/// Parses a JSON array of `{id?, name, username, image?}` objects.
pub fn parse_seed_users(json: &str) -> Result<Vec<User>, SeedError> {
    let seeds: Vec<SeedUser> = serde_json::from_str(json)?;
    Ok(seeds.into_iter().map(User::from).collect())
}

pub fn load_seed_users(path: &Path) -> Result<Vec<User>, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    parse_seed_users(&raw)
}

/// In-process [`ThreadStore`], used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryThreadStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    threads: Vec<Thread>,
    index: HashMap<ThreadId, usize>,
    last_created: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Creation times never repeat within one store.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(created_at);
        created_at
    }

    fn push_thread(&mut self, thread: Thread) {
        self.index.insert(thread.id, self.threads.len());
        self.threads.push(thread);
    }

    fn thread_mut(&mut self, id: ThreadId) -> Option<&mut Thread> {
        let idx = *self.index.get(&id)?;
        self.threads.get_mut(idx)
    }

    fn top_level_newest_first(&self) -> Vec<&Thread> {
        let mut threads: Vec<&Thread> = self
            .threads
            .iter()
            .filter(|thread| thread.is_top_level())
            .collect();
        threads.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        threads
    }
}

impl MemoryThreadStore {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let state = MemoryState {
            users: users.into_iter().map(|user| (user.id, user)).collect(),
            ..MemoryState::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Users are created outside this service; this seeds one.
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user);
    }

    pub async fn thread_count(&self) -> usize {
        self.state.read().await.threads.len()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn insert_thread(&self, new: NewThread) -> Result<Thread, StoreError> {
        let mut state = self.state.write().await;
        let thread = Thread {
            id: ThreadId::new(),
            text: new.text,
            author: new.author,
            parent_id: None,
            community_id: new.community_id,
            children: Vec::new(),
            created_at: state.next_created_at(),
        };
        let author = state
            .users
            .get_mut(&new.author)
            .ok_or_else(|| StoreError::user_not_found(new.author))?;
        author.threads.push(thread.id);
        state.push_thread(thread.clone());
        Ok(thread)
    }

    async fn insert_comment(
        &self,
        parent: ThreadId,
        new: NewThread,
    ) -> Result<Thread, StoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&new.author) {
            return Err(StoreError::user_not_found(new.author));
        }
        let comment = Thread {
            id: ThreadId::new(),
            text: new.text,
            author: new.author,
            parent_id: Some(parent),
            community_id: new.community_id,
            children: Vec::new(),
            created_at: state.next_created_at(),
        };
        let parent_thread = state
            .thread_mut(parent)
            .ok_or_else(|| StoreError::thread_not_found(parent))?;
        parent_thread.children.push(comment.id);
        state.push_thread(comment.clone());
        Ok(comment)
    }

    async fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .index
            .get(&id)
            .and_then(|idx| state.threads.get(*idx))
            .cloned())
    }

    async fn find_threads(&self, ids: &[ThreadId]) -> Result<Vec<Thread>, StoreError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.index.get(id))
            .filter_map(|idx| state.threads.get(*idx))
            .cloned()
            .collect())
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .cloned()
            .collect())
    }

    async fn list_top_level(&self, skip: u64, limit: u64) -> Result<Vec<Thread>, StoreError> {
        let state = self.state.read().await;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(state
            .top_level_newest_first()
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_top_level(&self) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        let count = state.threads.iter().filter(|thread| thread.is_top_level()).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
