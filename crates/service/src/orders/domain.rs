use models::{order_goods, order_info};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// Orders shown per page of the order list.
pub const ORDERS_PER_PAGE: u64 = 1;

/// Status code → display label, in code order.
pub const ORDER_STATUS: [(i16, &str); 5] = [
    (1, "unpaid"),
    (2, "awaiting shipment"),
    (3, "awaiting receipt"),
    (4, "awaiting review"),
    (5, "completed"),
];

/// Label rendered for codes missing from [`ORDER_STATUS`].
pub const UNKNOWN_STATUS: &str = "unknown";

pub fn status_label(code: i16) -> Option<&'static str> {
    ORDER_STATUS.iter().find(|(c, _)| *c == code).map(|(_, label)| *label)
}

/// A stored line item plus its computed subtotal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedLineItem {
    #[serde(flatten)]
    pub item: order_goods::Model,
    pub subtotal: Decimal,
}

impl From<order_goods::Model> for EnrichedLineItem {
    fn from(item: order_goods::Model) -> Self {
        let mut subtotal = item.price * Decimal::from(item.count);
        if subtotal.is_sign_negative() {
            warn!(order_id = %item.order_id, line_id = item.id, %subtotal, "negative line subtotal clamped to zero");
            subtotal = Decimal::ZERO;
        }
        Self { item, subtotal }
    }
}

/// A stored order with its line items and status label attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: order_info::Model,
    pub status_name: &'static str,
    pub line_items: Vec<EnrichedLineItem>,
}

impl EnrichedOrder {
    pub fn new(order: order_info::Model, items: Vec<order_goods::Model>) -> Self {
        let status_name = status_label(order.order_status).unwrap_or(UNKNOWN_STATUS);
        let line_items = items
            .into_iter()
            .filter(|item| item.order_id == order.order_id)
            .map(EnrichedLineItem::from)
            .collect();
        Self { order, status_name, line_items }
    }
}

/// One page of the order list, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPage {
    pub current_page: u64,
    pub total_pages: u64,
    pub pages: Vec<u64>,
    pub orders_on_page: Vec<EnrichedOrder>,
}
