//! SeaORM entities for the user center plus model-level validation helpers.

pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod address;
pub mod goods_sku;
pub mod order_info;
pub mod order_goods;

#[cfg(test)]
mod tests;
