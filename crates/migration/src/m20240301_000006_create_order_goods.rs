//! Create `order_goods` table: line items with FKs to `order_info` and `goods_sku`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderGoods::Table)
                    .if_not_exists()
                    .col(big_integer(OrderGoods::Id).primary_key().auto_increment())
                    .col(string_len(OrderGoods::OrderId, 128).not_null())
                    .col(big_integer(OrderGoods::SkuId).not_null())
                    .col(integer(OrderGoods::Count).not_null().default(1))
                    .col(decimal_len(OrderGoods::Price, 10, 2).not_null())
                    .col(string_len(OrderGoods::Comment, 256).not_null().default(""))
                    .col(timestamp_with_time_zone(OrderGoods::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_goods_order")
                            .from(OrderGoods::Table, OrderGoods::OrderId)
                            .to(OrderInfo::Table, OrderInfo::OrderId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_goods_sku")
                            .from(OrderGoods::Table, OrderGoods::SkuId)
                            .to(GoodsSku::Table, GoodsSku::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrderGoods::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OrderGoods { Table, Id, OrderId, SkuId, Count, Price, Comment, CreatedAt }

#[derive(DeriveIden)]
enum OrderInfo { Table, OrderId }

#[derive(DeriveIden)]
enum GoodsSku { Table, Id }
