//! Create `order_info` table with FK to `user`.
//!
//! Orders are keyed by a caller-generated string id.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderInfo::Table)
                    .if_not_exists()
                    .col(string_len(OrderInfo::OrderId, 128).primary_key())
                    .col(big_integer(OrderInfo::UserId).not_null())
                    .col(small_integer(OrderInfo::PayMethod).not_null().default(3))
                    .col(integer(OrderInfo::TotalCount).not_null().default(1))
                    .col(decimal_len(OrderInfo::TotalPrice, 10, 2).not_null())
                    .col(decimal_len(OrderInfo::TransitPrice, 10, 2).not_null())
                    .col(small_integer(OrderInfo::OrderStatus).not_null().default(1))
                    .col(string_len(OrderInfo::TradeNo, 128).not_null().default(""))
                    .col(timestamp_with_time_zone(OrderInfo::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_user")
                            .from(OrderInfo::Table, OrderInfo::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrderInfo::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OrderInfo { Table, OrderId, UserId, PayMethod, TotalCount, TotalPrice, TransitPrice, OrderStatus, TradeNo, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
