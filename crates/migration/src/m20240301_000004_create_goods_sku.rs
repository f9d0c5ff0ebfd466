//! Create `goods_sku` table: the sellable product variants shown in history.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GoodsSku::Table)
                    .if_not_exists()
                    .col(big_integer(GoodsSku::Id).primary_key().auto_increment())
                    .col(string_len(GoodsSku::Name, 20).not_null())
                    .col(string_len(GoodsSku::Description, 256).not_null())
                    .col(decimal_len(GoodsSku::Price, 10, 2).not_null())
                    .col(string_len(GoodsSku::Unite, 20).not_null())
                    .col(string_len(GoodsSku::Image, 256).not_null())
                    .col(integer(GoodsSku::Stock).not_null().default(1))
                    .col(integer(GoodsSku::Sales).not_null().default(0))
                    .col(small_integer(GoodsSku::Status).not_null().default(1))
                    .col(timestamp_with_time_zone(GoodsSku::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(GoodsSku::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum GoodsSku { Table, Id, Name, Description, Price, Unite, Image, Stock, Sales, Status, CreatedAt }
