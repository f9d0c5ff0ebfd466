use async_trait::async_trait;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError>;
    /// Insert an inactive user and its password hash atomically.
    ///
    /// A taken username is [`AuthError::Conflict`], including when another
    /// registration wins the race after the caller's lookup.
    async fn create_user_with_credentials(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError>;
    async fn set_active(&self, id: i64) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    use crate::sync::lock;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<i64, AuthUser>>,     // key: user id
        creds: Mutex<HashMap<i64, Credentials>>, // key: user id
        next_id: AtomicI64,
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = lock(&self.users);
            Ok(users.values().find(|u| u.username == username).cloned())
        }

        async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users).get(&id).cloned())
        }

        async fn create_user_with_credentials(
            &self,
            username: &str,
            email: &str,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users);
            if users.values().any(|u| u.username == username) {
                return Err(AuthError::Conflict);
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let user = AuthUser { id, username: username.to_string(), email: email.to_string(), is_active: false };
            users.insert(id, user.clone());
            lock(&self.creds).insert(id, Credentials { user_id: id, password_hash, password_algorithm });
            Ok(user)
        }

        async fn set_active(&self, id: i64) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users);
            let user = users.get_mut(&id).ok_or(AuthError::NotFound)?;
            user.is_active = true;
            Ok(user.clone())
        }

        async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError> {
            Ok(lock(&self.creds).get(&user_id).cloned())
        }
    }
}
