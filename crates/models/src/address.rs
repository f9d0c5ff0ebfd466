use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "address")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub receiver: String,
    pub addr: String,
    pub zip_code: Option<String>,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields supplied when adding an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAddress {
    pub receiver: String,
    pub addr: String,
    pub zip_code: Option<String>,
    pub phone: String,
}

/// Mainland mobile number: 11 digits, `1` then one of `3 4 5 7 8`.
pub fn validate_phone(phone: &str) -> Result<(), errors::ModelError> {
    let invalid = || errors::ModelError::Validation("invalid phone number".into());
    let mut chars = phone.chars();
    if chars.next() != Some('1') { return Err(invalid()); }
    match chars.next() {
        Some('3' | '4' | '5' | '7' | '8') => {}
        _ => return Err(invalid()),
    }
    let rest: Vec<char> = chars.collect();
    if rest.len() != 9 || !rest.iter().all(char::is_ascii_digit) {
        return Err(invalid());
    }
    Ok(())
}

pub async fn find_default(db: &DatabaseConnection, user_id: i64) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsDefault.eq(true))
        .order_by_asc(Column::Id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn create(db: &DatabaseConnection, user_id: i64, input: NewAddress, is_default: bool) -> Result<Model, errors::ModelError> {
    if input.receiver.trim().is_empty() || input.addr.trim().is_empty() {
        return Err(errors::ModelError::Validation("receiver and addr required".into()));
    }
    validate_phone(&input.phone)?;
    let am = ActiveModel {
        user_id: Set(user_id),
        receiver: Set(input.receiver),
        addr: Set(input.addr),
        zip_code: Set(input.zip_code.filter(|z| !z.trim().is_empty())),
        phone: Set(input.phone),
        is_default: Set(is_default),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::validate_phone;

    #[test]
    fn phone_rules() {
        assert!(validate_phone("13812345678").is_ok());
        assert!(validate_phone("18000000000").is_ok());
        assert!(validate_phone("12812345678").is_err());
        assert!(validate_phone("1381234567").is_err());
        assert!(validate_phone("138123456789").is_err());
        assert!(validate_phone("1381234567a").is_err());
        assert!(validate_phone("1|812345678").is_err());
        assert!(validate_phone("").is_err());
    }
}
