use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::errors::ServiceError;

/// Entries read from a history list.
pub const HISTORY_LIMIT: usize = 5;

/// Redis key of a user's history list.
pub fn history_key(user_id: i64) -> String {
    format!("history_{}", user_id)
}

/// Read side of the per-user browsing history (most recent first).
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Up to `limit` sku ids, most recently viewed first.
    async fn recent(&self, user_id: i64, limit: usize) -> Result<Vec<String>, ServiceError>;
}

/// History lists stored as Redis lists under [`history_key`].
#[derive(Clone)]
pub struct RedisHistoryStore {
    conn: ConnectionManager,
}

impl RedisHistoryStore {
    pub fn new(conn: ConnectionManager) -> Self { Self { conn } }
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn recent(&self, user_id: i64, limit: usize) -> Result<Vec<String>, ServiceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(limit - 1).unwrap_or(isize::MAX);
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.lrange(history_key(user_id), 0, stop).await?;
        Ok(ids)
    }
}

/// In-memory history lists for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::sync::lock;

    #[derive(Default)]
    pub struct MemoryHistoryStore {
        lists: Mutex<HashMap<i64, Vec<String>>>, // key: user_id, front = most recent
    }

    impl MemoryHistoryStore {
        /// Prepend an id, like `LPUSH`.
        pub fn push_front(&self, user_id: i64, sku_id: impl Into<String>) {
            lock(&self.lists).entry(user_id).or_default().insert(0, sku_id.into());
        }
    }

    #[async_trait]
    impl HistoryStore for MemoryHistoryStore {
        async fn recent(&self, user_id: i64, limit: usize) -> Result<Vec<String>, ServiceError> {
            let lists = lock(&self.lists);
            Ok(lists.get(&user_id).map(|l| l.iter().take(limit).cloned().collect()).unwrap_or_default())
        }
    }
}
