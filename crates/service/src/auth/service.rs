use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, CurrentUser, LoginInput, RegisterInput, SessionClaims};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::session::SessionStore;
use crate::mail::{activation_email, Mailer};
use crate::token::{TokenCodec, TokenError};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub password_algorithm: String,
    pub session_ttl: Duration,
    pub activation_ttl: Duration,
    pub mail_from: String,
    pub site_url: String,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &configs::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.security.secret_key.clone(),
            password_algorithm: "argon2".into(),
            session_ttl: Duration::hours(cfg.security.session_ttl_hours),
            activation_ttl: Duration::seconds(cfg.security.activation_ttl_secs),
            mail_from: cfg.mail.from.clone(),
            site_url: cfg.mail.site_url.clone(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
    tokens: TokenCodec,
    mailer: Mailer,
    sessions: Arc<dyn SessionStore>,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig, mailer: Mailer, sessions: Arc<dyn SessionStore>) -> Self {
        let tokens = TokenCodec::new(&cfg.jwt_secret, cfg.activation_ttl);
        Self { repo, cfg, tokens, mailer, sessions }
    }

    /// Register an inactive user and queue the activation email.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::session::mock::MemorySessionStore;
    /// use service::auth::domain::RegisterInput;
    /// use service::mail::{Mailer, LogTransport};
    /// use std::sync::Arc;
    /// tokio_test::block_on(async {
    ///     let cfg = AuthConfig {
    ///         jwt_secret: "secret".into(),
    ///         password_algorithm: "argon2".into(),
    ///         session_ttl: chrono::Duration::hours(12),
    ///         activation_ttl: chrono::Duration::hours(1),
    ///         mail_from: "shop@example.com".into(),
    ///         site_url: "http://127.0.0.1:8000".into(),
    ///     };
    ///     let svc = AuthService::new(
    ///         Arc::new(MockAuthRepository::default()),
    ///         cfg,
    ///         Mailer::spawn(LogTransport),
    ///         Arc::new(MemorySessionStore::default()),
    ///     );
    ///     let input = RegisterInput { username: "alice".into(), password: "Secret123".into(), email: "alice@example.com".into(), allow: Some("on".into()) };
    ///     let user = svc.register(input).await.unwrap();
    ///     assert!(!user.is_active);
    /// });
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() || input.email.trim().is_empty() {
            return Err(AuthError::Validation("incomplete data".into()));
        }
        let email = input.email.trim();
        if models::user::validate_email(email).is_err() {
            return Err(AuthError::Validation("invalid email".into()));
        }
        if input.allow.as_deref() != Some("on") {
            return Err(AuthError::Validation("please accept the user agreement".into()));
        }
        models::user::validate_username(username)?;
        if let Some(existing) = self.repo.find_user_by_username(username).await? {
            debug!("user exists: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        // Hash before writing anything; the user and its credentials land together.
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        let user = self.repo
            .create_user_with_credentials(username, email, hash, self.cfg.password_algorithm.clone())
            .await?;

        let token = self.tokens.encode(user.id).map_err(|e| AuthError::TokenError(e.to_string()))?;
        self.mailer.enqueue(activation_email(&self.cfg.mail_from, &self.cfg.site_url, &user.email, &user.username, &token));
        info!(user_id = user.id, username = %user.username, "user_registered");
        Ok(user)
    }

    /// Activate the account named by an activation token.
    #[instrument(skip(self, token))]
    pub async fn activate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let user_id = match self.tokens.decode(token) {
            Ok(id) => id,
            Err(TokenError::Expired) => return Err(AuthError::LinkExpired),
            Err(_) => return Err(AuthError::LinkInvalid),
        };
        if self.repo.find_user_by_id(user_id).await?.is_none() {
            warn!(user_id, "activation token for unknown user");
            return Err(AuthError::LinkInvalid);
        }
        let user = self.repo.set_active(user_id).await?;
        info!(user_id, "user_activated");
        Ok(user)
    }

    /// Authenticate a user and issue a session token.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("incomplete data".into()));
        }
        let user = self.repo
            .find_user_by_username(username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }
        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        let token = self.issue_session(&user).await?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Open a server-side session for `user` and sign a token naming it.
    pub async fn issue_session(&self, user: &AuthUser) -> Result<String, AuthError> {
        let jti = Uuid::new_v4().simple().to_string();
        let exp = (Utc::now() + self.cfg.session_ttl).timestamp();
        let claims = SessionClaims { sub: user.username.clone(), uid: user.id, exp, jti };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        let ttl = u64::try_from(self.cfg.session_ttl.num_seconds()).unwrap_or(0);
        self.sessions.open(&claims.jti, user.id, ttl).await?;
        Ok(token)
    }

    /// Resolve a session token to the user it was issued for.
    ///
    /// The signature and expiry must hold and the session must still be open.
    pub async fn verify_session(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.decode_session(token)?;
        if !self.sessions.is_open(&claims.jti).await? {
            debug!(user_id = claims.uid, "session closed");
            return Err(AuthError::Unauthorized);
        }
        Ok(CurrentUser { id: claims.uid, username: claims.sub })
    }

    /// Close the session behind `token`. Tokens that do not decode name no
    /// session, so there is nothing to close.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let Ok(claims) = self.decode_session(token) else {
            return Ok(());
        };
        self.sessions.close(&claims.jti).await?;
        info!(user_id = claims.uid, "user_logged_out");
        Ok(())
    }

    fn decode_session(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthorized)
    }
}
