use serde::{Deserialize, Serialize};

/// Registration form. `allow` is the agreement checkbox, `"on"` when ticked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterInput {
    #[serde(default, alias = "user_name")]
    pub username: String,
    #[serde(default, alias = "pwd")]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub allow: Option<String>,
}

/// Login form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "pwd")]
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: i64,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}

/// Session JWT payload. `jti` names the server-side session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub uid: i64,
    pub exp: i64,
    pub jti: String,
}

/// The signed-in user a request acts for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}
