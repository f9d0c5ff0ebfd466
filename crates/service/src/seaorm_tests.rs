//! SeaORM repositories against a live database; skipped without one.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::address::{repository::SeaOrmAddressRepository, AddressInput, AddressService};
use crate::auth::{repo::seaorm::SeaOrmAuthRepository, repository::AuthRepository};
use crate::history::repository::{GoodsRepository, SeaOrmGoodsRepository};
use crate::orders::{repository::SeaOrmOrderRepository, OrderService};
use crate::test_support::get_db;
use models::{goods_sku, order_goods, order_info, user};

fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
async fn auth_repository_round_trip() -> Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let repo = SeaOrmAuthRepository { db: db.clone() };

    let name = unique_name("auth");
    let created = repo.create_user_with_credentials(&name, "auth@example.com", "hash".into(), "argon2".into()).await?;
    assert!(!created.is_active);
    assert_eq!(repo.find_user_by_username(&name).await?.map(|u| u.id), Some(created.id));
    assert!(repo.set_active(created.id).await?.is_active);
    assert_eq!(repo.get_credentials(created.id).await?.map(|c| c.password_hash), Some("hash".to_string()));

    let again = repo.create_user_with_credentials(&name, "other@example.com", "hash".into(), "argon2".into()).await;
    assert!(matches!(again, Err(crate::auth::errors::AuthError::Conflict)));

    user::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn order_pages_come_newest_first_with_line_items() -> Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let u = user::create(&db, &unique_name("orders"), "orders@example.com").await?;
    let sku = goods_sku::create(&db, "grape", Decimal::new(250, 2), "500g").await?;

    let now = chrono::Utc::now();
    let mut ids = Vec::new();
    for age in [2i64, 1] {
        let order_id = unique_name("o");
        order_info::ActiveModel {
            order_id: Set(order_id.clone()),
            user_id: Set(u.id),
            pay_method: Set(1),
            total_count: Set(3),
            total_price: Set(Decimal::new(750, 2)),
            transit_price: Set(Decimal::new(1000, 2)),
            order_status: Set(1),
            trade_no: Set(String::new()),
            created_at: Set((now - chrono::Duration::minutes(age)).into()),
        }
        .insert(&db)
        .await?;
        order_goods::ActiveModel {
            order_id: Set(order_id.clone()),
            sku_id: Set(sku.id),
            count: Set(3),
            price: Set(sku.price),
            comment: Set(String::new()),
            created_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        ids.push(order_id);
    }

    let svc = OrderService::new(Arc::new(SeaOrmOrderRepository { db: db.clone() }));
    let page = svc.order_page(u.id, "1").await?;
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.orders_on_page[0].order.order_id, ids[1]);
    assert_eq!(page.orders_on_page[0].line_items[0].subtotal, Decimal::new(750, 2));

    let goods = SeaOrmGoodsRepository { db: db.clone() };
    assert_eq!(goods.find_sku(sku.id).await?.map(|s| s.name), Some("grape".to_string()));

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    goods_sku::Entity::delete_by_id(sku.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn address_service_on_database() -> Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let u = user::create(&db, &unique_name("addr"), "addr@example.com").await?;
    let svc = AddressService::new(Arc::new(SeaOrmAddressRepository { db: db.clone() }));

    let input = AddressInput { receiver: "Li Lei".into(), addr: "1 Garden Road".into(), zip: None, phone: "13812345678".into() };
    let first = svc.add_address(u.id, input.clone()).await?;
    let second = svc.add_address(u.id, input).await?;
    assert!(first.is_default && !second.is_default);

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    Ok(())
}
