use async_trait::async_trait;
use models::goods_sku;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::errors::ServiceError;

#[async_trait]
pub trait GoodsRepository: Send + Sync {
    async fn find_sku(&self, id: i64) -> Result<Option<goods_sku::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmGoodsRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl GoodsRepository for SeaOrmGoodsRepository {
    async fn find_sku(&self, id: i64) -> Result<Option<goods_sku::Model>, ServiceError> {
        Ok(goods_sku::Entity::find_by_id(id).one(&self.db).await?)
    }
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::sync::lock;

    #[derive(Default)]
    pub struct MockGoodsRepository {
        skus: Mutex<HashMap<i64, goods_sku::Model>>,
    }

    impl MockGoodsRepository {
        pub fn insert(&self, sku: goods_sku::Model) {
            lock(&self.skus).insert(sku.id, sku);
        }
    }

    #[async_trait]
    impl GoodsRepository for MockGoodsRepository {
        async fn find_sku(&self, id: i64) -> Result<Option<goods_sku::Model>, ServiceError> {
            Ok(lock(&self.skus).get(&id).cloned())
        }
    }
}
