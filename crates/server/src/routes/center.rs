//! Signed-in user pages: profile summary, order history, addresses.

use axum::{
    extract::{Path, State},
    response::Redirect,
    Extension, Json,
};
use serde_json::{json, Value};

use service::address::AddressInput;
use service::auth::domain::CurrentUser;

use super::extract::FormOrJson;
use crate::errors::JsonApiError;
use crate::state::AppState;

/// Default address plus the recently viewed goods.
#[utoipa::path(get, path = "/user", tag = "center", responses((status = 200, description = "Profile page data"), (status = 303, description = "Not signed in"), (status = 404, description = "History references a missing product", body = crate::openapi::ErrorDoc)))]
pub async fn info(State(state): State<AppState>, Extension(user): Extension<CurrentUser>) -> Result<Json<Value>, JsonApiError> {
    let address = state.addresses.default_address(user.id).await?;
    let goods_li = state.history.recently_viewed(user.id).await?;
    Ok(Json(json!({ "page": "user", "address": address, "goods_li": goods_li })))
}

#[utoipa::path(get, path = "/user/order/{page}", tag = "center", params(("page" = String, Path, description = "1-based page; anything unusable shows page 1")), responses((status = 200, description = "One page of orders with the page window"), (status = 303, description = "Not signed in")))]
pub async fn orders(State(state): State<AppState>, Extension(user): Extension<CurrentUser>, Path(page): Path<String>) -> Result<Json<Value>, JsonApiError> {
    order_listing(&state, &user, &page).await
}

/// `/user/order` without a page number.
pub async fn orders_first(State(state): State<AppState>, Extension(user): Extension<CurrentUser>) -> Result<Json<Value>, JsonApiError> {
    order_listing(&state, &user, "1").await
}

async fn order_listing(state: &AppState, user: &CurrentUser, page: &str) -> Result<Json<Value>, JsonApiError> {
    let listing = state.orders.order_page(user.id, page).await?;
    Ok(Json(json!({
        "page": "order",
        "current_page": listing.current_page,
        "pages": listing.pages,
        "total_pages": listing.total_pages,
        "orders_on_page": listing.orders_on_page,
    })))
}

#[utoipa::path(get, path = "/user/address", tag = "center", responses((status = 200, description = "Default address"), (status = 303, description = "Not signed in")))]
pub async fn address(State(state): State<AppState>, Extension(user): Extension<CurrentUser>) -> Result<Json<Value>, JsonApiError> {
    let address = state.addresses.default_address(user.id).await?;
    Ok(Json(json!({ "page": "address", "address": address })))
}

#[utoipa::path(post, path = "/user/address", tag = "center", request_body = crate::openapi::AddressRequest, responses((status = 303, description = "Saved; back to the address page"), (status = 400, description = "Missing field or bad phone", body = crate::openapi::ErrorDoc)))]
pub async fn add_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    FormOrJson(input): FormOrJson<AddressInput>,
) -> Result<Redirect, JsonApiError> {
    state.addresses.add_address(user.id, input).await?;
    Ok(Redirect::to("/user/address"))
}
