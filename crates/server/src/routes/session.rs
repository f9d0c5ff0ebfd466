use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use service::auth::domain::CurrentUser;

use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "auth_token";
/// Name of the "remember me" cookie holding the last username.
pub const REMEMBER_COOKIE: &str = "username";

/// Session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    bearer
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
}

/// The signed-in user, if the request carries a valid session.
pub async fn current_user(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Option<CurrentUser> {
    let token = session_token(headers, jar)?;
    state.auth.verify_session(&token).await.ok()
}

/// Login page URL that returns to `target` (path plus query) afterwards.
pub fn login_redirect(target: &str) -> String {
    match serde_urlencoded::to_string([("next", target)]) {
        Ok(query) => format!("/user/login?{query}"),
        Err(_) => "/user/login".to_string(),
    }
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") => n.to_string(),
        _ => "/".to_string(),
    }
}

/// Gate for user-center routes.
///
/// Resolves the session into a [`CurrentUser`] request extension; without a
/// valid session the client is sent to the login page with `next` set to the
/// requested path and query.
pub async fn require_login(State(state): State<AppState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    match current_user(&state, req.headers(), &jar).await {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            let target = req.uri().path_and_query().map_or("/", |pq| pq.as_str());
            debug!(%target, "no valid session; redirecting to login");
            Redirect::to(&login_redirect(target)).into_response()
        }
    }
}
