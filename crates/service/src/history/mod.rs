//! Recently viewed products: per-user history lists in Redis resolved to
//! full sku records in stored order.

pub mod store;
pub mod repository;
pub mod service;

pub use service::HistoryService;
