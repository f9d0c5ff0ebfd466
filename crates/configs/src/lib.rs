use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8000, worker_threads: Some(4), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Key-value store holding the per-user browsing history lists.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RedisConfig {
    #[serde(default)]
    pub url: String,
}

/// Signing secret and lifetimes of activation links, sessions and cookies.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_activation_ttl")]
    pub activation_ttl_secs: i64,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_remember_days")]
    pub remember_days: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            activation_ttl_secs: default_activation_ttl(),
            session_ttl_hours: default_session_ttl(),
            remember_days: default_remember_days(),
        }
    }
}

/// Outgoing mail. Without `smtp_host` mail is only logged.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_mail_from")]
    pub from: String,
    /// Public base URL used to build activation links.
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_starttls: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: default_mail_from(),
            site_url: default_site_url(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
            smtp_starttls: false,
        }
    }
}

fn default_static_dir() -> String { "static".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_activation_ttl() -> i64 { 3600 }
fn default_session_ttl() -> i64 { 12 }
fn default_remember_days() -> i64 { 7 }
fn default_mail_from() -> String { "dailyfresh <noreply@dailyfresh.local>".into() }
fn default_site_url() -> String { "http://127.0.0.1:8000".into() }
fn default_smtp_port() -> u16 { 25 }

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/9";

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

/// Load `path`, or defaults when the file does not exist. A file that exists
/// but cannot be read or parsed is an error.
pub fn load_from_file_or_default(path: &str) -> Result<AppConfig> {
    match load_from_file(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) if is_not_found(&e) => {
            tracing::info!(path, "no config file; using defaults and environment");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e.context(format!("failed to load {path}"))),
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Like [`AppConfig::load_and_validate`], but a missing config file falls
    /// back to defaults filled from environment variables.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_from_file_or_default(&config_path())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.redis.normalize_from_env();
        self.redis.validate()?;
        self.security.normalize_from_env();
        self.security.validate()?;
        self.mail.normalize_from_env();
        self.mail.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl RedisConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            self.url = std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("redis://") || lower.starts_with("rediss://")) {
            return Err(anyhow!("redis.url must start with redis:// or rediss://"));
        }
        Ok(())
    }
}

impl SecurityConfig {
    pub fn normalize_from_env(&mut self) {
        if self.secret_key.trim().is_empty() {
            if let Ok(key) = std::env::var("SECRET_KEY") {
                self.secret_key = key;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret_key.trim().is_empty() {
            return Err(anyhow!("security.secret_key is empty; set it in config.toml or SECRET_KEY"));
        }
        if self.activation_ttl_secs <= 0 || self.session_ttl_hours <= 0 || self.remember_days <= 0 {
            return Err(anyhow!("security lifetimes must be positive"));
        }
        Ok(())
    }
}

impl MailConfig {
    pub fn normalize_from_env(&mut self) {
        fill_from_env(&mut self.smtp_host, "SMTP_HOST");
        fill_from_env(&mut self.smtp_user, "SMTP_USER");
        fill_from_env(&mut self.smtp_password, "SMTP_PASSWORD");
        // blank entries mean unset
        for field in [&mut self.smtp_host, &mut self.smtp_user, &mut self.smtp_password] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.from.contains('@') {
            return Err(anyhow!("mail.from must contain an address"));
        }
        if !(self.site_url.starts_with("http://") || self.site_url.starts_with("https://")) {
            return Err(anyhow!("mail.site_url must start with http(s)"));
        }
        if self.smtp_host.is_some() && self.smtp_port == 0 {
            return Err(anyhow!("mail.smtp_port must be in 1..=65535"));
        }
        if self.smtp_user.is_some() != self.smtp_password.is_some() {
            return Err(anyhow!("mail.smtp_user and mail.smtp_password must be set together"));
        }
        Ok(())
    }
}

fn fill_from_env(field: &mut Option<String>, var: &str) {
    if field.is_none() {
        if let Ok(v) = std::env::var(var) {
            *field = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 9000

        [database]
        url = "postgres://df:df@localhost:5432/df2"

        [redis]
        url = "redis://localhost:6379/9"

        [security]
        secret_key = "test-secret"

        [mail]
        site_url = "https://shop.example.com"
    "#;

    #[test]
    fn parses_sections_and_fills_defaults() {
        let cfg = load_from_str(FULL).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.static_dir, "static");
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.security.activation_ttl_secs, 3600);
        assert_eq!(cfg.security.remember_days, 7);
        assert_eq!(cfg.mail.site_url, "https://shop.example.com");
        assert!(cfg.mail.from.contains('@'));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let cfg = load_from_str(FULL).unwrap();
        assert!(cfg.database.validate().is_ok());
        assert!(cfg.redis.validate().is_ok());
        assert!(cfg.security.validate().is_ok());
        assert!(cfg.mail.validate().is_ok());
    }

    #[test]
    fn rejects_non_postgres_url() {
        let db = DatabaseConfig { url: "mysql://localhost/df2".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let db = DatabaseConfig {
            url: "postgres://localhost/df2".into(),
            min_connections: 5,
            max_connections: 2,
            ..DatabaseConfig::default()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_empty_secret_and_non_positive_ttl() {
        let empty = SecurityConfig::default();
        assert!(empty.validate().is_err());
        let zero_ttl = SecurityConfig { secret_key: "k".into(), activation_ttl_secs: 0, ..SecurityConfig::default() };
        assert!(zero_ttl.validate().is_err());
    }

    fn scratch_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("dailyfresh-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("dailyfresh-no-such-config.toml");
        let cfg = load_from_file_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = scratch_file("malformed", "[server\nport = \"nine\"");
        let err = load_from_file_or_default(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load"));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn wrong_typed_field_is_an_error() {
        let path = scratch_file("typed", "[server]\nhost = \"0.0.0.0\"\nport = \"nine\"\n");
        assert!(load_from_file_or_default(path.to_str().unwrap()).is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn present_file_is_used() {
        let path = scratch_file("full", FULL);
        let cfg = load_from_file_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn smtp_settings() {
        let cfg = load_from_str(
            "[mail]\nsmtp_host = \"smtp.example.com\"\nsmtp_user = \"shop\"\nsmtp_password = \"pw\"\n",
        )
        .unwrap();
        assert_eq!(cfg.mail.smtp_port, 25);
        assert!(!cfg.mail.smtp_starttls);
        assert!(cfg.mail.validate().is_ok());

        let half = MailConfig { smtp_host: Some("smtp.example.com".into()), smtp_user: Some("shop".into()), ..MailConfig::default() };
        assert!(half.validate().is_err());
    }

    #[test]
    fn rejects_non_redis_scheme() {
        let redis = RedisConfig { url: "http://localhost:6379".into() };
        assert!(redis.validate().is_err());
    }
}
