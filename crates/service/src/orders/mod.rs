//! Order list of the user center: page selection, navigation window and
//! per-order enrichment (line-item subtotals, status label).

pub mod domain;
pub mod repository;
pub mod service;

pub use service::OrderService;
