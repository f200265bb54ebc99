use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, Transaction};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::pool::{DbConnector, DbPoolError};
use threadline_core::domain::threads::{NewThread, Thread, User};
use threadline_core::store::{StoreError, ThreadStore};
use threadline_core::types::id::{CommunityId, ThreadId, UserId};

#[derive(Debug, Error)]
pub enum ThreadsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("pool error: {0}")]
    Pool(#[from] DbPoolError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
}

impl From<ThreadsRepoError> for StoreError {
    fn from(err: ThreadsRepoError) -> Self {
        match err {
            ThreadsRepoError::NotFound { entity, id } => StoreError::NotFound {
                entity,
                id: id.to_string(),
            },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

pub async fn insert_thread(
    pool: &PgPool,
    new: &NewThread,
    created_at: DateTime<Utc>,
) -> Result<Thread, ThreadsRepoError> {
    let id = ThreadId::new();
    let mut tx = pool.begin().await?;
    let linked = sqlx::query(
        r#"
        UPDATE users
        SET threads = array_append(threads, $1)
        WHERE id = $2
        "#,
    )
    .bind(id.as_uuid())
    .bind(new.author.as_uuid())
    .execute(&mut *tx)
    .await?;
    if linked.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(ThreadsRepoError::NotFound {
            entity: "user",
            id: new.author.as_uuid(),
        });
    }
    insert_row(&mut tx, id, new, None, created_at).await?;
    tx.commit().await?;
    Ok(Thread {
        id,
        text: new.text.clone(),
        author: new.author,
        parent_id: None,
        community_id: new.community_id,
        children: Vec::new(),
        created_at,
    })
}

pub async fn insert_comment(
    pool: &PgPool,
    parent: ThreadId,
    new: &NewThread,
    created_at: DateTime<Utc>,
) -> Result<Thread, ThreadsRepoError> {
    let id = ThreadId::new();
    let mut tx = pool.begin().await?;
    let author = sqlx::query(
        r#"
        SELECT 1
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(new.author.as_uuid())
    .fetch_optional(&mut *tx)
    .await?;
    if author.is_none() {
        tx.rollback().await?;
        return Err(ThreadsRepoError::NotFound {
            entity: "user",
            id: new.author.as_uuid(),
        });
    }
    let linked = sqlx::query(
        r#"
        UPDATE threads
        SET children = array_append(children, $1)
        WHERE id = $2
        "#,
    )
    .bind(id.as_uuid())
    .bind(parent.as_uuid())
    .execute(&mut *tx)
    .await?;
    if linked.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(ThreadsRepoError::NotFound {
            entity: "thread",
            id: parent.as_uuid(),
        });
    }
    insert_row(&mut tx, id, new, Some(parent), created_at).await?;
    tx.commit().await?;
    Ok(Thread {
        id,
        text: new.text.clone(),
        author: new.author,
        parent_id: Some(parent),
        community_id: new.community_id,
        children: Vec::new(),
        created_at,
    })
}

pub async fn find_thread(pool: &PgPool, id: ThreadId) -> Result<Option<Thread>, ThreadsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, text, author_id, parent_id, community_id, children, created_at
        FROM threads
        WHERE id = $1
        "#,
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;
    row.map(map_thread).transpose()
}

pub async fn find_threads(pool: &PgPool, ids: &[ThreadId]) -> Result<Vec<Thread>, ThreadsRepoError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<Uuid> = ids.iter().map(ThreadId::as_uuid).collect();
    let rows = sqlx::query(
        r#"
        SELECT id, text, author_id, parent_id, community_id, children, created_at
        FROM threads
        WHERE id = ANY($1)
        "#,
    )
    .bind(&raw)
    .fetch_all(pool)
    .await?;
    let mut by_id = HashMap::with_capacity(rows.len());
    for row in rows {
        let thread = map_thread(row)?;
        by_id.insert(thread.id, thread);
    }
    Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
}

pub async fn find_users(pool: &PgPool, ids: &[UserId]) -> Result<Vec<User>, ThreadsRepoError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<Uuid> = ids.iter().map(UserId::as_uuid).collect();
    let rows = sqlx::query(
        r#"
        SELECT id, name, username, image, threads
        FROM users
        WHERE id = ANY($1)
        "#,
    )
    .bind(&raw)
    .fetch_all(pool)
    .await?;
    let mut by_id = HashMap::with_capacity(rows.len());
    for row in rows {
        let user = map_user(row)?;
        by_id.insert(user.id, user);
    }
    Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
}

pub async fn list_top_level(
    pool: &PgPool,
    skip: u64,
    limit: u64,
) -> Result<Vec<Thread>, ThreadsRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id, text, author_id, parent_id, community_id, children, created_at
        FROM threads
        WHERE parent_id IS NULL
        ORDER BY created_at DESC, id DESC
        OFFSET $1
        LIMIT $2
        "#,
    )
    .bind(i64::try_from(skip).unwrap_or(i64::MAX))
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;
    let mut threads = Vec::with_capacity(rows.len());
    for row in rows {
        threads.push(map_thread(row)?);
    }
    Ok(threads)
}

pub async fn count_top_level(pool: &PgPool) -> Result<u64, ThreadsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM threads
        WHERE parent_id IS NULL
        "#,
    )
    .fetch_one(pool)
    .await?;
    let count: i64 = row.try_get("count")?;
    Ok(u64::try_from(count).unwrap_or(0))
}

async fn insert_row(
    tx: &mut Transaction<'_, sqlx::Postgres>,
    id: ThreadId,
    new: &NewThread,
    parent: Option<ThreadId>,
    created_at: DateTime<Utc>,
) -> Result<(), ThreadsRepoError> {
    sqlx::query(
        r#"
        INSERT INTO threads (
            id,
            text,
            author_id,
            parent_id,
            community_id,
            created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id.as_uuid())
    .bind(&new.text)
    .bind(new.author.as_uuid())
    .bind(parent.map(|value| value.as_uuid()))
    .bind(new.community_id.map(|value| value.as_uuid()))
    .bind(created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn map_thread(row: sqlx::postgres::PgRow) -> Result<Thread, ThreadsRepoError> {
    let id: Uuid = row.try_get("id")?;
    let author: Uuid = row.try_get("author_id")?;
    let parent_id: Option<Uuid> = row.try_get("parent_id")?;
    let community_id: Option<Uuid> = row.try_get("community_id")?;
    let children: Vec<Uuid> = row.try_get("children")?;
    Ok(Thread {
        id: ThreadId::from_uuid(id),
        text: row.try_get("text")?,
        author: UserId::from_uuid(author),
        parent_id: parent_id.map(ThreadId::from_uuid),
        community_id: community_id.map(CommunityId::from_uuid),
        children: children.into_iter().map(ThreadId::from_uuid).collect(),
        created_at: row.try_get("created_at")?,
    })
}

fn map_user(row: sqlx::postgres::PgRow) -> Result<User, ThreadsRepoError> {
    let id: Uuid = row.try_get("id")?;
    let threads: Vec<Uuid> = row.try_get("threads")?;
    Ok(User {
        id: UserId::from_uuid(id),
        name: row.try_get("name")?,
        username: row.try_get("username")?,
        image: row.try_get("image")?,
        threads: threads.into_iter().map(ThreadId::from_uuid).collect(),
    })
}

/// Postgres-backed [`ThreadStore`]. The pool is acquired through the shared
/// connector at the start of every call.
#[derive(Debug, Clone)]
pub struct PgThreadStore {
    connector: Arc<DbConnector>,
}

impl PgThreadStore {
    pub fn new(connector: Arc<DbConnector>) -> Self {
        Self { connector }
    }

    async fn pool(&self) -> Result<&PgPool, ThreadsRepoError> {
        Ok(self.connector.pool().await?)
    }
}

#[async_trait]
impl ThreadStore for PgThreadStore {
    async fn insert_thread(&self, new: NewThread) -> Result<Thread, StoreError> {
        let pool = self.pool().await?;
        let thread = insert_thread(pool, &new, Utc::now()).await?;
        debug!(thread_id = %thread.id, author = %thread.author, "thread row inserted");
        Ok(thread)
    }

    async fn insert_comment(
        &self,
        parent: ThreadId,
        new: NewThread,
    ) -> Result<Thread, StoreError> {
        let pool = self.pool().await?;
        let comment = insert_comment(pool, parent, &new, Utc::now()).await?;
        debug!(thread_id = %comment.id, parent_id = %parent, "comment row inserted");
        Ok(comment)
    }

    async fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, StoreError> {
        let pool = self.pool().await?;
        Ok(find_thread(pool, id).await?)
    }

    async fn find_threads(&self, ids: &[ThreadId]) -> Result<Vec<Thread>, StoreError> {
        let pool = self.pool().await?;
        Ok(find_threads(pool, ids).await?)
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let pool = self.pool().await?;
        Ok(find_users(pool, ids).await?)
    }

    async fn list_top_level(&self, skip: u64, limit: u64) -> Result<Vec<Thread>, StoreError> {
        let pool = self.pool().await?;
        Ok(list_top_level(pool, skip, limit).await?)
    }

    async fn count_top_level(&self) -> Result<u64, StoreError> {
        let pool = self.pool().await?;
        Ok(count_top_level(pool).await?)
    }
}
