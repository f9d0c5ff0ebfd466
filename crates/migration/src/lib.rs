//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_user;
mod m20240301_000002_create_user_credentials;
mod m20240301_000003_create_address;
mod m20240301_000004_create_goods_sku;
mod m20240301_000005_create_order_info;
mod m20240301_000006_create_order_goods;
mod m20240301_000007_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_user::Migration),
            Box::new(m20240301_000002_create_user_credentials::Migration),
            Box::new(m20240301_000003_create_address::Migration),
            Box::new(m20240301_000004_create_goods_sku::Migration),
            Box::new(m20240301_000005_create_order_info::Migration),
            Box::new(m20240301_000006_create_order_goods::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000007_add_indexes::Migration),
        ]
    }
}
