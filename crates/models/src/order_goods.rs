use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{goods_sku, order_info};

/// One line of an order: a sku, the unit price paid and the quantity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_goods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: String,
    pub sku_id: i64,
    pub count: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub comment: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Order,
    Sku,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Order => Entity::belongs_to(order_info::Entity)
                .from(Column::OrderId)
                .to(order_info::Column::OrderId)
                .into(),
            Relation::Sku => Entity::belongs_to(goods_sku::Entity)
                .from(Column::SkuId)
                .to(goods_sku::Column::Id)
                .into(),
        }
    }
}

impl Related<order_info::Entity> for Entity {
    fn to() -> RelationDef { Relation::Order.def() }
}

impl ActiveModelBehavior for ActiveModel {}
