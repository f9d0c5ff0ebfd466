use async_trait::async_trait;
use models::{order_goods, order_info};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select};

use crate::errors::ServiceError;

/// Read access to a user's orders and their line items.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Number of pages of `per_page` orders the user has (0 when none).
    async fn count_pages(&self, user_id: i64, per_page: u64) -> Result<u64, ServiceError>;
    /// Orders on the 0-based `page_index`, newest first.
    async fn fetch_page(&self, user_id: i64, page_index: u64, per_page: u64) -> Result<Vec<order_info::Model>, ServiceError>;
    /// Line items whose order reference equals `order_id`.
    async fn line_items(&self, order_id: &str) -> Result<Vec<order_goods::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmOrderRepository {
    pub db: DatabaseConnection,
}

fn user_orders(user_id: i64) -> Select<order_info::Entity> {
    order_info::Entity::find()
        .filter(order_info::Column::UserId.eq(user_id))
        .order_by_desc(order_info::Column::CreatedAt)
        .order_by_desc(order_info::Column::OrderId)
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn count_pages(&self, user_id: i64, per_page: u64) -> Result<u64, ServiceError> {
        let pages = user_orders(user_id).paginate(&self.db, per_page.max(1)).num_pages().await?;
        Ok(pages)
    }

    async fn fetch_page(&self, user_id: i64, page_index: u64, per_page: u64) -> Result<Vec<order_info::Model>, ServiceError> {
        let orders = user_orders(user_id)
            .paginate(&self.db, per_page.max(1))
            .fetch_page(page_index)
            .await?;
        Ok(orders)
    }

    async fn line_items(&self, order_id: &str) -> Result<Vec<order_goods::Model>, ServiceError> {
        let items = order_goods::Entity::find()
            .filter(order_goods::Column::OrderId.eq(order_id))
            .order_by_asc(order_goods::Column::Id)
            .all(&self.db)
            .await?;
        Ok(items)
    }
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    use crate::sync::lock;

    #[derive(Default)]
    pub struct MockOrderRepository {
        orders: Mutex<Vec<order_info::Model>>,
        items: Mutex<Vec<order_goods::Model>>,
    }

    impl MockOrderRepository {
        pub fn insert_order(&self, order: order_info::Model) {
            lock(&self.orders).push(order);
        }

        pub fn insert_item(&self, item: order_goods::Model) {
            lock(&self.items).push(item);
        }

        fn sorted_for(&self, user_id: i64) -> Vec<order_info::Model> {
            let mut orders: Vec<_> = lock(&self.orders).iter().filter(|o| o.user_id == user_id).cloned().collect();
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.order_id.cmp(&a.order_id)));
            orders
        }
    }

    #[async_trait]
    impl OrderRepository for MockOrderRepository {
        async fn count_pages(&self, user_id: i64, per_page: u64) -> Result<u64, ServiceError> {
            let count = self.sorted_for(user_id).len() as u64;
            Ok(count.div_ceil(per_page.max(1)))
        }

        async fn fetch_page(&self, user_id: i64, page_index: u64, per_page: u64) -> Result<Vec<order_info::Model>, ServiceError> {
            let per_page = per_page.max(1) as usize;
            let skip = (page_index as usize).saturating_mul(per_page);
            Ok(self.sorted_for(user_id).into_iter().skip(skip).take(per_page).collect())
        }

        async fn line_items(&self, order_id: &str) -> Result<Vec<order_goods::Model>, ServiceError> {
            Ok(lock(&self.items).iter().filter(|i| i.order_id == order_id).cloned().collect())
        }
    }
}
