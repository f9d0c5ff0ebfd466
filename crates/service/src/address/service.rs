use std::sync::Arc;

use models::address::{self, NewAddress};
use serde::Deserialize;
use tracing::{info, instrument};

use super::repository::AddressRepository;
use crate::errors::ServiceError;

/// Address form as submitted by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub addr: String,
    #[serde(default, alias = "zip_code")]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: String,
}

pub struct AddressService<R: AddressRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: AddressRepository + ?Sized> AddressService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn default_address(&self, user_id: i64) -> Result<Option<address::Model>, ServiceError> {
        self.repo.find_default(user_id).await
    }

    /// Store a new address. It becomes the default when the user has none yet.
    #[instrument(skip(self, input))]
    pub async fn add_address(&self, user_id: i64, input: AddressInput) -> Result<address::Model, ServiceError> {
        let receiver = input.receiver.trim();
        let addr = input.addr.trim();
        let phone = input.phone.trim();
        if receiver.is_empty() || addr.is_empty() || phone.is_empty() {
            return Err(ServiceError::Validation("incomplete data".into()));
        }
        if address::validate_phone(phone).is_err() {
            return Err(ServiceError::Validation("invalid phone number".into()));
        }
        let is_default = self.repo.find_default(user_id).await?.is_none();
        let new = NewAddress {
            receiver: receiver.to_string(),
            addr: addr.to_string(),
            zip_code: input.zip.map(|z| z.trim().to_string()),
            phone: phone.to_string(),
        };
        let created = self.repo.create(user_id, new, is_default).await?;
        info!(address_id = created.id, is_default, "address_added");
        Ok(created)
    }
}
