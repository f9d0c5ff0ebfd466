use std::sync::Arc;

use tracing::{info, warn};

use configs::AppConfig;
use service::address::{repository::{AddressRepository, SeaOrmAddressRepository}, AddressService};
use service::auth::{
    repo::seaorm::SeaOrmAuthRepository,
    repository::AuthRepository,
    service::{AuthConfig, AuthService},
    session::{RedisSessionStore, SessionStore},
};
use service::history::{
    repository::{GoodsRepository, SeaOrmGoodsRepository},
    store::{HistoryStore, RedisHistoryStore},
    HistoryService,
};
use service::mail::{LogTransport, Mailer, SmtpTransport};
use service::orders::{repository::{OrderRepository, SeaOrmOrderRepository}, OrderService};

use crate::errors::StartupError;

/// Storage behind the services, as trait objects so tests can swap in mocks.
pub struct Backends {
    pub auth: Arc<dyn AuthRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub history: Arc<dyn HistoryStore>,
    pub goods: Arc<dyn GoodsRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub sessions: Arc<dyn SessionStore>,
}

/// Cookie lifetimes applied by the login handlers.
#[derive(Clone, Copy, Debug)]
pub struct CookieSettings {
    pub session_ttl_hours: i64,
    pub remember_days: i64,
}

impl From<&configs::SecurityConfig> for CookieSettings {
    fn from(s: &configs::SecurityConfig) -> Self {
        Self { session_ttl_hours: s.session_ttl_hours, remember_days: s.remember_days }
    }
}

/// Shared, cheaply cloneable handler state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<dyn AuthRepository>>,
    pub orders: Arc<OrderService<dyn OrderRepository>>,
    pub history: Arc<HistoryService<dyn HistoryStore, dyn GoodsRepository>>,
    pub addresses: Arc<AddressService<dyn AddressRepository>>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(backends: Backends, auth_cfg: AuthConfig, mailer: Mailer, cookies: CookieSettings) -> Self {
        Self {
            auth: Arc::new(AuthService::new(backends.auth, auth_cfg, mailer, backends.sessions)),
            orders: Arc::new(OrderService::new(backends.orders)),
            history: Arc::new(HistoryService::new(backends.history, backends.goods)),
            addresses: Arc::new(AddressService::new(backends.addresses)),
            cookies,
        }
    }

    /// Open the database pool and the shared Redis connection, then start the
    /// mail worker on the configured transport.
    pub async fn connect(cfg: &AppConfig) -> Result<Self, StartupError> {
        let db = models::db::connect_with_config(&cfg.database)
            .await
            .map_err(|e| StartupError::Backend(format!("database: {e}")))?;
        let redis = service::cache::connect(&cfg.redis.url)
            .await
            .map_err(|e| StartupError::Backend(format!("redis: {e}")))?;
        info!("backends connected");

        let backends = Backends {
            auth: Arc::new(SeaOrmAuthRepository { db: db.clone() }),
            orders: Arc::new(SeaOrmOrderRepository { db: db.clone() }),
            history: Arc::new(RedisHistoryStore::new(redis.clone())),
            goods: Arc::new(SeaOrmGoodsRepository { db: db.clone() }),
            addresses: Arc::new(SeaOrmAddressRepository { db }),
            sessions: Arc::new(RedisSessionStore::new(redis)),
        };
        let smtp = SmtpTransport::from_config(&cfg.mail)
            .map_err(|e| StartupError::InvalidConfig(format!("mail: {e}")))?;
        let mailer = match smtp {
            Some(relay) => Mailer::spawn(relay),
            None => {
                warn!("mail.smtp_host not set; activation mail is only logged");
                Mailer::spawn(LogTransport)
            }
        };
        Ok(Self::new(backends, AuthConfig::from_app_config(cfg), mailer, CookieSettings::from(&cfg.security)))
    }
}
