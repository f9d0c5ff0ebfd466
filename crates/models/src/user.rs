use sea_orm::{entity::prelude::*, ConnectionTrait, Set, DatabaseConnection, TransactionTrait};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{address, order_info, user_credentials};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Address,
    Order,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Address => Entity::has_many(address::Entity).into(),
            Relation::Order => Entity::has_many(order_info::Entity).into(),
        }
    }
}

impl Related<address::Entity> for Entity {
    fn to() -> RelationDef { Relation::Address.def() }
}

impl Related<order_info::Entity> for Entity {
    fn to() -> RelationDef { Relation::Order.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    let trimmed = username.trim();
    if trimmed.is_empty() { return Err(errors::ModelError::Validation("username required".into())); }
    if trimmed.chars().count() > 64 { return Err(errors::ModelError::Validation("username too long (<=64)".into())); }
    Ok(())
}

/// Accepts `local@host.tld` or `local@host.sld.tld`, lowercase only.
///
/// The local part starts with a lowercase letter or digit followed by word
/// characters, `.` or `-`; the host is lowercase alphanumerics and `-`; each
/// suffix is 2 to 5 lowercase letters.
pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let invalid = || errors::ModelError::Validation("invalid email".into());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;

    let mut local_chars = local.chars();
    match local_chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return Err(invalid()),
    }
    if !local_chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(invalid());
    }

    let mut labels = domain.split('.');
    let host = labels.next().unwrap_or_default();
    if host.is_empty() || !host.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(invalid());
    }
    let suffixes: Vec<&str> = labels.collect();
    if suffixes.is_empty() || suffixes.len() > 2 {
        return Err(invalid());
    }
    let suffix_ok = |s: &&str| (2..=5).contains(&s.len()) && s.chars().all(|c| c.is_ascii_lowercase());
    if !suffixes.iter().all(suffix_ok) {
        return Err(invalid());
    }
    Ok(())
}

/// Insert a new, not yet activated user.
///
/// A taken username surfaces as [`errors::ModelError::Conflict`].
pub async fn create<C: ConnectionTrait>(db: &C, username: &str, email: &str) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    validate_email(email)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        username: Set(username.trim().to_string()),
        email: Set(email.to_string()),
        is_active: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// Insert an inactive user together with its password hash in one transaction.
///
/// Either both rows are written or neither is.
pub async fn create_with_password(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password_hash: String,
    algorithm: &str,
) -> Result<(Model, user_credentials::Model), errors::ModelError> {
    let txn = db.begin().await?;
    let user = create(&txn, username, email).await?;
    let creds = user_credentials::upsert_password(&txn, user.id, password_hash, algorithm).await?;
    txn.commit().await?;
    Ok((user, creds))
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Username.eq(username.trim()))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn set_active(db: &DatabaseConnection, id: i64, active: bool) -> Result<Model, errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::Validation("user not found".into()))?
        .into();
    found.is_active = Set(active);
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        for ok in ["alice@example.com", "a.b-c_d@mail-box.co.uk", "9lives@x9.io"] {
            assert!(validate_email(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "alice",
            "Alice@example.com",
            "_alice@example.com",
            "alice@example",
            "alice@example.c",
            "alice@example.comcom",
            "alice@a.b.c.d",
            "alice@Example.com",
            "alice@@example.com",
            "ali ce@example.com",
        ] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn username_must_be_present_and_short() {
        assert!(validate_username("  ").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
        assert!(validate_username("bob").is_ok());
    }
}
