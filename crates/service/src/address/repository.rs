use async_trait::async_trait;
use models::address::{self, NewAddress};
use sea_orm::DatabaseConnection;

use crate::errors::ServiceError;

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn find_default(&self, user_id: i64) -> Result<Option<address::Model>, ServiceError>;
    async fn create(&self, user_id: i64, input: NewAddress, is_default: bool) -> Result<address::Model, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmAddressRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AddressRepository for SeaOrmAddressRepository {
    async fn find_default(&self, user_id: i64) -> Result<Option<address::Model>, ServiceError> {
        Ok(address::find_default(&self.db, user_id).await?)
    }

    async fn create(&self, user_id: i64, input: NewAddress, is_default: bool) -> Result<address::Model, ServiceError> {
        Ok(address::create(&self.db, user_id, input, is_default).await?)
    }
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    use crate::sync::lock;

    #[derive(Default)]
    pub struct MockAddressRepository {
        rows: Mutex<Vec<address::Model>>,
    }

    impl MockAddressRepository {
        pub fn all(&self, user_id: i64) -> Vec<address::Model> {
            lock(&self.rows).iter().filter(|a| a.user_id == user_id).cloned().collect()
        }
    }

    #[async_trait]
    impl AddressRepository for MockAddressRepository {
        async fn find_default(&self, user_id: i64) -> Result<Option<address::Model>, ServiceError> {
            Ok(lock(&self.rows).iter().find(|a| a.user_id == user_id && a.is_default).cloned())
        }

        async fn create(&self, user_id: i64, input: NewAddress, is_default: bool) -> Result<address::Model, ServiceError> {
            let mut rows = lock(&self.rows);
            let row = address::Model {
                id: rows.len() as i64 + 1,
                user_id,
                receiver: input.receiver,
                addr: input.addr,
                zip_code: input.zip_code.filter(|z| !z.trim().is_empty()),
                phone: input.phone,
                is_default,
                created_at: Utc::now().into(),
            };
            rows.push(row.clone());
            Ok(row)
        }
    }
}
