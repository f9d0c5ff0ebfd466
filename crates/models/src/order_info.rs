use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{order_goods, user};

/// An order header. Rows are written by checkout; this workspace reads them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: String,
    pub user_id: i64,
    pub pay_method: i16,
    pub total_count: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub transit_price: Decimal,
    pub order_status: i16,
    pub trade_no: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    OrderGoods,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::OrderGoods => Entity::has_many(order_goods::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<order_goods::Entity> for Entity {
    fn to() -> RelationDef { Relation::OrderGoods.def() }
}

impl ActiveModelBehavior for ActiveModel {}
