//! Shipping addresses of the signed-in user.

pub mod repository;
pub mod service;

pub use service::{AddressInput, AddressService};
