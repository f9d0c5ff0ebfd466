use std::sync::Arc;
use models::goods_sku;
use tracing::{debug, instrument, warn};

use super::repository::GoodsRepository;
use super::store::{HistoryStore, HISTORY_LIMIT};
use crate::errors::ServiceError;

/// Resolves a user's recently viewed sku ids into sku records.
pub struct HistoryService<H: HistoryStore + ?Sized, G: GoodsRepository + ?Sized> {
    history: Arc<H>,
    goods: Arc<G>,
}

impl<H: HistoryStore + ?Sized, G: GoodsRepository + ?Sized> HistoryService<H, G> {
    pub fn new(history: Arc<H>, goods: Arc<G>) -> Self { Self { history, goods } }

    /// The user's last [`HISTORY_LIMIT`] viewed skus, most recent first.
    ///
    /// Records come back in history order, one lookup per id. An id without
    /// a matching sku fails the whole call with [`ServiceError::NotFound`].
    #[instrument(skip(self))]
    pub async fn recently_viewed(&self, user_id: i64) -> Result<Vec<goods_sku::Model>, ServiceError> {
        let ids = self.history.recent(user_id, HISTORY_LIMIT).await?;
        let mut goods = Vec::with_capacity(ids.len());
        for raw in ids {
            let missing = || ServiceError::NotFound(format!("goods sku {} not found", raw));
            let id: i64 = raw.trim().parse().map_err(|_| missing())?;
            match self.goods.find_sku(id).await? {
                Some(sku) => goods.push(sku),
                None => {
                    warn!(sku_id = id, "history references a missing sku");
                    return Err(missing());
                }
            }
        }
        debug!(count = goods.len(), "recently viewed resolved");
        Ok(goods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{repository::mock::MockGoodsRepository, store::mock::MemoryHistoryStore};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sku(id: i64) -> goods_sku::Model {
        goods_sku::Model {
            id,
            name: format!("item{id}"),
            description: String::new(),
            price: Decimal::new(id * 100, 2),
            unite: "500g".into(),
            image: String::new(),
            stock: 10,
            sales: 0,
            status: 1,
            created_at: Utc::now().into(),
        }
    }

    fn service(history: MemoryHistoryStore, goods: MockGoodsRepository) -> HistoryService<MemoryHistoryStore, MockGoodsRepository> {
        HistoryService::new(Arc::new(history), Arc::new(goods))
    }

    #[tokio::test]
    async fn keeps_history_order() {
        let history = MemoryHistoryStore::default();
        // viewed 2, then 1, then 3: the list reads [3, 1, 2]
        for id in ["2", "1", "3"] {
            history.push_front(9, id);
        }
        let goods = MockGoodsRepository::default();
        for id in 1..=3 {
            goods.insert(sku(id));
        }

        let got = service(history, goods).recently_viewed(9).await.unwrap();
        let ids: Vec<i64> = got.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn only_five_most_recent() {
        let history = MemoryHistoryStore::default();
        let goods = MockGoodsRepository::default();
        for id in 1..=8 {
            history.push_front(9, id.to_string());
            goods.insert(sku(id));
        }
        let ids: Vec<i64> = service(history, goods).recently_viewed(9).await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![8, 7, 6, 5, 4]);
    }

    #[tokio::test]
    async fn empty_history_is_empty() {
        let got = service(MemoryHistoryStore::default(), MockGoodsRepository::default()).recently_viewed(9).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn missing_sku_is_not_found() {
        let history = MemoryHistoryStore::default();
        history.push_front(9, "1");
        history.push_front(9, "404");
        let goods = MockGoodsRepository::default();
        goods.insert(sku(1));

        let err = service(history, goods).recently_viewed(9).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let history = MemoryHistoryStore::default();
        history.push_front(9, "abc");
        let err = service(history, MockGoodsRepository::default()).recently_viewed(9).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
