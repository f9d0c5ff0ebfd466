use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use super::errors::AuthError;

/// Redis key of one open session.
pub fn session_key(session_id: &str) -> String {
    format!("session_{}", session_id)
}

/// Server-side record of open sessions. A session token is only honoured
/// while its id is open here, so closing it revokes the token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn open(&self, session_id: &str, user_id: i64, ttl_secs: u64) -> Result<(), AuthError>;
    async fn is_open(&self, session_id: &str) -> Result<bool, AuthError>;
    async fn close(&self, session_id: &str) -> Result<(), AuthError>;
}

/// Sessions kept as expiring Redis keys under [`session_key`].
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self { Self { conn } }
}

fn store_err(e: redis::RedisError) -> AuthError {
    AuthError::Repository(e.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn open(&self, session_id: &str, user_id: i64, ttl_secs: u64) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(session_key(session_id), user_id, ttl_secs.max(1)).await.map_err(store_err)
    }

    async fn is_open(&self, session_id: &str) -> Result<bool, AuthError> {
        let mut conn = self.conn.clone();
        conn.exists(session_key(session_id)).await.map_err(store_err)
    }

    async fn close(&self, session_id: &str) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(session_key(session_id)).await.map_err(store_err)
    }
}

/// In-memory session store for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::sync::lock;

    #[derive(Default)]
    pub struct MemorySessionStore {
        open: Mutex<HashMap<String, i64>>, // key: session id
    }

    impl MemorySessionStore {
        pub fn open_count(&self) -> usize {
            lock(&self.open).len()
        }
    }

    #[async_trait]
    impl SessionStore for MemorySessionStore {
        async fn open(&self, session_id: &str, user_id: i64, _ttl_secs: u64) -> Result<(), AuthError> {
            lock(&self.open).insert(session_id.to_string(), user_id);
            Ok(())
        }

        async fn is_open(&self, session_id: &str) -> Result<bool, AuthError> {
            Ok(lock(&self.open).contains_key(session_id))
        }

        async fn close(&self, session_id: &str) -> Result<(), AuthError> {
            lock(&self.open).remove(session_id);
            Ok(())
        }
    }
}
