//! Shared Redis connection for history lists and server-side sessions.

use redis::{aio::{ConnectionManager, ConnectionManagerConfig}, Client};
use tracing::info;

use crate::errors::ServiceError;

/// Open a reconnecting connection manager. Clones share one connection.
pub async fn connect(redis_url: &str) -> Result<ConnectionManager, ServiceError> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(1);
    let client = Client::open(redis_url)?;
    let conn = client.get_connection_manager_with_config(config).await?;
    info!("redis connected");
    Ok(conn)
}
