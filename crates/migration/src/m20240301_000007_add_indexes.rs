use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Address: default lookup per user
        manager
            .create_index(
                Index::create()
                    .name("idx_address_user_default")
                    .table(Address::Table)
                    .col(Address::UserId)
                    .col(Address::IsDefault)
                    .to_owned(),
            )
            .await?;

        // OrderInfo: newest-first listing per user
        manager
            .create_index(
                Index::create()
                    .name("idx_order_user_created")
                    .table(OrderInfo::Table)
                    .col(OrderInfo::UserId)
                    .col(OrderInfo::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // OrderGoods: line items by order
        manager
            .create_index(
                Index::create()
                    .name("idx_order_goods_order")
                    .table(OrderGoods::Table)
                    .col(OrderGoods::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_order_goods_order").table(OrderGoods::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_order_user_created").table(OrderInfo::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_address_user_default").table(Address::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Address { Table, UserId, IsDefault }

#[derive(DeriveIden)]
enum OrderInfo { Table, UserId, CreatedAt }

#[derive(DeriveIden)]
enum OrderGoods { Table, OrderId }
