use std::sync::Arc;
use tracing::{debug, instrument};

use super::domain::{EnrichedOrder, OrderPage, ORDERS_PER_PAGE};
use super::repository::OrderRepository;
use crate::errors::ServiceError;
use crate::pagination::{page_window, select_page};

/// Builds the paginated order list of one user.
pub struct OrderService<R: OrderRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: OrderRepository + ?Sized> OrderService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Resolve `requested_page` against the user's orders and load that page.
    ///
    /// Malformed or out-of-range page input lands on page 1; only store
    /// failures are returned as errors.
    #[instrument(skip(self))]
    pub async fn order_page(&self, user_id: i64, requested_page: &str) -> Result<OrderPage, ServiceError> {
        // An empty listing still has one (empty) page.
        let total_pages = self.repo.count_pages(user_id, ORDERS_PER_PAGE).await?.max(1);
        let current_page = select_page(total_pages, requested_page);
        let pages = page_window(total_pages, current_page);

        let orders = self.repo.fetch_page(user_id, current_page - 1, ORDERS_PER_PAGE).await?;
        let mut orders_on_page = Vec::with_capacity(orders.len());
        for order in orders {
            orders_on_page.push(self.enrich(order).await?);
        }

        debug!(total_pages, current_page, shown = orders_on_page.len(), "order page resolved");
        Ok(OrderPage { current_page, total_pages, pages, orders_on_page })
    }

    /// Attach line items, subtotals and the status label to a stored order.
    pub async fn enrich(&self, order: models::order_info::Model) -> Result<EnrichedOrder, ServiceError> {
        let items = self.repo.line_items(&order.order_id).await?;
        Ok(EnrichedOrder::new(order, items))
    }
}
