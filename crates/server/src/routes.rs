use axum::{
    middleware,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod center;
pub mod extract;
pub mod session;
pub mod user;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public account routes, the
/// login-gated user center, and static assets when `static_dir` is given.
pub fn build_router(state: AppState, cors: CorsLayer, static_dir: Option<&str>) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/user/register", axum::routing::post(user::register))
        .route("/user/active/:token", get(user::activate))
        .route("/user/login", get(user::login_page).post(user::login))
        .route("/user/logout", get(user::logout));

    let center_routes = Router::new()
        .route("/user", get(center::info))
        .route("/user/order", get(center::orders_first))
        .route("/user/order/:page", get(center::orders))
        .route("/user/address", get(center::address).post(center::add_address))
        .route_layer(middleware::from_fn_with_state(state.clone(), session::require_login));

    let mut app = public.merge(center_routes).with_state(state);
    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
            // 5xx at ERROR
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
