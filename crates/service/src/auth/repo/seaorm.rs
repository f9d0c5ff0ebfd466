use sea_orm::{DatabaseConnection, EntityTrait};

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser { id: u.id, username: u.username, email: u.email, is_active: u.is_active }
}

fn to_credentials(c: models::user_credentials::Model) -> Credentials {
    Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_username(&self.db, username).await?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user_with_credentials(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let (created, _creds) =
            models::user::create_with_password(&self.db, username, email, password_hash, &password_algorithm).await?;
        Ok(to_auth_user(created))
    }

    async fn set_active(&self, id: i64) -> Result<AuthUser, AuthError> {
        let updated = models::user::set_active(&self.db, id, true).await?;
        Ok(to_auth_user(updated))
    }

    async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id).await?;
        Ok(res.map(to_credentials))
    }
}
