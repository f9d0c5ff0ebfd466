//! End-to-end HTTP tests over in-memory backends.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

use models::{goods_sku, order_goods, order_info};
use server::routes::build_router;
use server::state::{AppState, Backends, CookieSettings};
use service::address::repository::mock::MockAddressRepository;
use service::auth::{
    domain::AuthUser, repository::mock::MockAuthRepository, service::AuthConfig, session::mock::MemorySessionStore,
};
use service::history::{repository::mock::MockGoodsRepository, store::mock::MemoryHistoryStore};
use service::mail::{mock::capturing_mailer, EmailJob};
use service::orders::repository::mock::MockOrderRepository;

struct TestApp {
    router: Router,
    state: AppState,
    orders: Arc<MockOrderRepository>,
    history: Arc<MemoryHistoryStore>,
    goods: Arc<MockGoodsRepository>,
    mail: UnboundedReceiver<EmailJob>,
}

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".into(),
        password_algorithm: "argon2".into(),
        session_ttl: Duration::hours(12),
        activation_ttl: Duration::hours(1),
        mail_from: "dailyfresh <noreply@dailyfresh.local>".into(),
        site_url: "http://shop.test".into(),
    }
}

fn test_app() -> TestApp {
    let orders = Arc::new(MockOrderRepository::default());
    let history = Arc::new(MemoryHistoryStore::default());
    let goods = Arc::new(MockGoodsRepository::default());
    let backends = Backends {
        auth: Arc::new(MockAuthRepository::default()),
        orders: orders.clone(),
        history: history.clone(),
        goods: goods.clone(),
        addresses: Arc::new(MockAddressRepository::default()),
        sessions: Arc::new(MemorySessionStore::default()),
    };
    let (mailer, mail) = capturing_mailer();
    let state = AppState::new(backends, auth_config(), mailer, CookieSettings { session_ttl_hours: 12, remember_days: 7 });
    let router = build_router(state.clone(), tower_http::cors::CorsLayer::very_permissive(), None);
    TestApp { router, state, orders, history, goods, mail }
}

async fn session_for(app: &TestApp, id: i64) -> String {
    let user = AuthUser { id, username: format!("user{id}"), email: format!("user{id}@example.com"), is_active: true };
    app.state.auth.issue_session(&user).await.unwrap()
}

/// Register `name` over HTTP and follow the emailed activation link.
async fn signed_up(app: &mut TestApp, name: &str) {
    let body = format!("user_name={name}&pwd=Passw0rd&email={name}%40example.com&allow=on");
    let resp = app.router.clone().oneshot(form("/user/register", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let job = app.mail.recv().await.unwrap();
    let marker = "/user/active/";
    let start = job.html_body.find(marker).unwrap() + marker.len();
    let token = job.html_body[start..].split('"').next().unwrap().to_string();
    let resp = app.router.clone().oneshot(get(&format!("/user/active/{token}"), None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::COOKIE, format!("auth_token={t}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).unwrap_or_default()
}

fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

fn seed_order(app: &TestApp, user_id: i64, order_id: &str, age_minutes: i64, status: i16) {
    app.orders.insert_order(order_info::Model {
        order_id: order_id.into(),
        user_id,
        pay_method: 1,
        total_count: 4,
        total_price: Decimal::new(850, 2),
        transit_price: Decimal::new(1000, 2),
        order_status: status,
        trade_no: String::new(),
        created_at: (Utc::now() - Duration::minutes(age_minutes)).into(),
    });
}

fn seed_item(app: &TestApp, id: i64, order_id: &str, price: Decimal, count: i32) {
    app.orders.insert_item(order_goods::Model {
        id,
        order_id: order_id.into(),
        sku_id: id,
        count,
        price,
        comment: String::new(),
        created_at: Utc::now().into(),
    });
}

fn sku(id: i64) -> goods_sku::Model {
    goods_sku::Model {
        id,
        name: format!("item{id}"),
        description: String::new(),
        price: Decimal::new(100, 2),
        unite: "500g".into(),
        image: String::new(),
        stock: 5,
        sales: 0,
        status: 1,
        created_at: Utc::now().into(),
    }
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app();
    let resp = app.router.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn register_activate_login_then_list_orders() {
    let mut app = test_app();

    let resp = app
        .router
        .clone()
        .oneshot(form("/user/register", "user_name=alice&pwd=Passw0rd&email=alice%40example.com&allow=on"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user_id = json_body(resp).await["user_id"].as_i64().unwrap();

    let job = app.mail.recv().await.unwrap();
    assert_eq!(job.to, "alice@example.com");
    let marker = "/user/active/";
    let start = job.html_body.find(marker).unwrap() + marker.len();
    let token = job.html_body[start..].split('"').next().unwrap().to_string();

    let resp = app.router.clone().oneshot(form("/user/login", "username=alice&pwd=Passw0rd")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app.router.clone().oneshot(get(&format!("/user/active/{token}"), None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/login");

    let resp = app
        .router
        .clone()
        .oneshot(form("/user/login?next=/user/order/1", "username=alice&pwd=Passw0rd&remember=on"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/order/1");
    let cookies = set_cookies(&resp);
    assert!(cookies.iter().any(|c| c.starts_with("username=alice")));
    let session = cookies
        .iter()
        .find_map(|c| c.strip_prefix("auth_token="))
        .and_then(|c| c.split(';').next())
        .unwrap()
        .to_string();

    seed_order(&app, user_id, "older", 10, 1);
    seed_order(&app, user_id, "newer", 1, 4);
    seed_item(&app, 1, "newer", Decimal::new(250, 2), 3);
    seed_item(&app, 2, "newer", Decimal::new(100, 2), 1);

    let resp = app.router.clone().oneshot(get("/user/order/1", Some(&session))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["page"], "order");
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["pages"], serde_json::json!([1, 2]));
    let order = &body["orders_on_page"][0];
    assert_eq!(order["order_id"], "newer");
    assert_eq!(order["status_name"], "awaiting review");
    assert_eq!(order["line_items"][0]["subtotal"], "7.50");
    assert_eq!(order["line_items"][1]["subtotal"], "1.00");
}

#[tokio::test]
async fn unknown_page_falls_back_to_first() {
    let app = test_app();
    seed_order(&app, 5, "only", 1, 1);
    let token = session_for(&app, 5).await;

    for uri in ["/user/order/abc", "/user/order/99", "/user/order"] {
        let resp = app.router.clone().oneshot(get(uri, Some(&token))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body = json_body(resp).await;
        assert_eq!(body["current_page"], 1, "{uri}");
        assert_eq!(body["pages"], serde_json::json!([1]), "{uri}");
    }
}

#[tokio::test]
async fn user_center_requires_login() {
    let app = test_app();
    let resp = app.router.clone().oneshot(get("/user/order/2", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/login?next=%2Fuser%2Forder%2F2");

    let resp = app.router.clone().oneshot(get("/user", Some("forged.token.value"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn login_returns_to_gated_page_with_its_query() {
    let mut app = test_app();
    signed_up(&mut app, "nina").await;

    let resp = app.router.clone().oneshot(get("/user/order/2?x=1&y=a%20b", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let login_url = location(&resp).to_string();
    assert_eq!(login_url, "/user/login?next=%2Fuser%2Forder%2F2%3Fx%3D1%26y%3Da%2520b");

    let resp = app.router.clone().oneshot(form(&login_url, "username=nina&pwd=Passw0rd")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/order/2?x=1&y=a%20b");
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let mut app = test_app();
    signed_up(&mut app, "otto").await;
    let resp = app
        .router
        .clone()
        .oneshot(form("/user/register", "user_name=otto&pwd=other&email=otto2%40example.com&allow=on"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn profile_lists_recently_viewed_in_history_order() {
    let app = test_app();
    for id in 1..=3 {
        app.goods.insert(sku(id));
    }
    for id in ["2", "1", "3"] {
        app.history.push_front(7, id);
    }
    let token = session_for(&app, 7).await;

    let req = Request::builder()
        .uri("/user")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let ids: Vec<i64> = body["goods_li"].as_array().unwrap().iter().map(|g| g["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert!(body["address"].is_null());
}

#[tokio::test]
async fn missing_history_product_is_not_found() {
    let app = test_app();
    app.history.push_front(8, "404");
    let token = session_for(&app, 8).await;
    let resp = app.router.clone().oneshot(get("/user", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_and_show_address() {
    let app = test_app();
    let token = session_for(&app, 3).await;

    let mut req = form("/user/address", "receiver=Li+Lei&addr=1+Garden+Road&zip_code=100000&phone=13812345678");
    req.headers_mut().insert(header::COOKIE, format!("auth_token={token}").parse().unwrap());
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/address");

    let resp = app.router.clone().oneshot(get("/user/address", Some(&token))).await.unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["page"], "address");
    assert_eq!(body["address"]["receiver"], "Li Lei");
    assert_eq!(body["address"]["is_default"], true);

    let mut bad = form("/user/address", "receiver=Li+Lei&addr=x&phone=123");
    bad.headers_mut().insert(header::COOKIE, format!("auth_token={token}").parse().unwrap());
    let resp = app.router.clone().oneshot(bad).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_activation_link_is_rejected() {
    let app = test_app();
    let resp = app.router.clone().oneshot(get("/user/active/not-a-token", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["detail"], "activation link invalid");
}

#[tokio::test]
async fn register_rejects_unchecked_agreement() {
    let app = test_app();
    let resp = app
        .router
        .clone()
        .oneshot(form("/user/register", "user_name=bob&pwd=x&email=bob%40example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_page_reflects_remember_cookie_and_logout_clears_session() {
    let app = test_app();
    let req = Request::builder().uri("/user/login").header(header::COOKIE, "username=alice").body(Body::empty()).unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(json_body(resp).await, serde_json::json!({"username": "alice", "checked": "checked"}));

    let token = session_for(&app, 4).await;
    let resp = app.router.clone().oneshot(get("/user/login?next=/user", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user");

    let resp = app.router.clone().oneshot(get("/user/logout", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(set_cookies(&resp).iter().any(|c| c.starts_with("auth_token=")));

    // a copy of the token kept past logout no longer opens the user center
    let resp = app.router.clone().oneshot(get("/user", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/login?next=%2Fuser");

    let bearer = Request::builder()
        .uri("/user/order/1")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(bearer).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app.router.clone().oneshot(get("/user/login", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
