use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Error body returned by every JSON endpoint.
#[derive(Debug, Clone)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub detail: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        let title = status.canonical_reason().unwrap_or("Error").to_string();
        Self { status, title, detail: detail.into() }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, detail) }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = %self.detail, "request failed");
        } else {
            warn!(status = %self.status, detail = %self.detail, "request rejected");
        }
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "title": self.title,
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            ServiceError::Model(models::errors::ModelError::Validation(msg)) => Self::bad_request(msg),
            ServiceError::Model(models::errors::ModelError::Conflict(msg)) => Self::new(StatusCode::CONFLICT, msg),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let status = match &e {
            AuthError::Validation(_) | AuthError::LinkExpired | AuthError::LinkInvalid => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Inactive => StatusCode::FORBIDDEN,
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let detail = match e {
            AuthError::Validation(msg) => msg,
            other => other.to_string(),
        };
        Self::new(status, detail)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("backend unavailable: {0}")]
    Backend(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(JsonApiError::from(ServiceError::not_found("goods sku 3")).status, StatusCode::NOT_FOUND);
        assert_eq!(JsonApiError::from(ServiceError::Validation("x".into())).status, StatusCode::BAD_REQUEST);
        assert_eq!(JsonApiError::from(ServiceError::Cache("down".into())).status, StatusCode::INTERNAL_SERVER_ERROR);
        let duplicate = ServiceError::Model(models::errors::ModelError::Conflict("user_username_key".into()));
        assert_eq!(JsonApiError::from(duplicate).status, StatusCode::CONFLICT);
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        let expired = JsonApiError::from(AuthError::LinkExpired);
        assert_eq!(expired.status, StatusCode::BAD_REQUEST);
        assert_eq!(expired.detail, "activation link expired");
        assert_eq!(JsonApiError::from(AuthError::Inactive).status, StatusCode::FORBIDDEN);
        assert_eq!(JsonApiError::from(AuthError::Conflict).status, StatusCode::CONFLICT);
    }
}
