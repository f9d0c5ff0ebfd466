use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::info;

use service::auth::domain::{LoginInput, RegisterInput};

use super::extract::FormOrJson;
use super::session::{current_user, safe_next, session_token, REMEMBER_COOKIE, SESSION_COOKIE};
use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: i64 }

/// Where to go after signing in.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextQuery { pub next: Option<String> }

/// Login form plus the "remember username" checkbox.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(flatten)]
    pub credentials: LoginInput,
    #[serde(default)]
    pub remember: Option<String>,
}

#[derive(Serialize)]
pub struct LoginPage { pub username: String, pub checked: &'static str }

#[utoipa::path(post, path = "/user/register", tag = "user", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered; activation email queued"), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc), (status = 409, description = "Username taken", body = crate::openapi::ErrorDoc)))]
pub async fn register(State(state): State<AppState>, FormOrJson(input): FormOrJson<RegisterInput>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(get, path = "/user/active/{token}", tag = "user", params(("token" = String, Path, description = "Activation token from the welcome email")), responses((status = 303, description = "Activated; redirect to login"), (status = 400, description = "Link expired or invalid", body = crate::openapi::ErrorDoc)))]
pub async fn activate(State(state): State<AppState>, Path(token): Path<String>) -> Result<Redirect, JsonApiError> {
    state.auth.activate(&token).await?;
    Ok(Redirect::to("/user/login"))
}

#[utoipa::path(get, path = "/user/login", tag = "user", params(NextQuery), responses((status = 200, description = "Remembered username"), (status = 303, description = "Already signed in")))]
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar, Query(q): Query<NextQuery>) -> Response {
    if current_user(&state, &headers, &jar).await.is_some() {
        return Redirect::to(&safe_next(q.next.as_deref())).into_response();
    }
    let page = match jar.get(REMEMBER_COOKIE) {
        Some(c) => LoginPage { username: c.value().to_string(), checked: "checked" },
        None => LoginPage { username: String::new(), checked: "" },
    };
    Json(page).into_response()
}

#[utoipa::path(post, path = "/user/login", tag = "user", params(NextQuery), request_body = crate::openapi::LoginRequest, responses((status = 303, description = "Signed in; session cookie set"), (status = 401, description = "Wrong username or password", body = crate::openapi::ErrorDoc), (status = 403, description = "Account not activated", body = crate::openapi::ErrorDoc)))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(q): Query<NextQuery>,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Result<(CookieJar, Redirect), JsonApiError> {
    let session = state.auth.login(form.credentials).await?;

    let session_cookie = Cookie::build((SESSION_COOKIE, session.token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(state.cookies.session_ttl_hours));
    let mut jar = jar.add(session_cookie);

    jar = if form.remember.as_deref() == Some("on") {
        jar.add(
            Cookie::build((REMEMBER_COOKIE, session.user.username.clone()))
                .path("/")
                .max_age(time::Duration::days(state.cookies.remember_days)),
        )
    } else {
        jar.remove(Cookie::build(REMEMBER_COOKIE).path("/"))
    };
    info!(user_id = session.user.id, "session_started");
    Ok((jar, Redirect::to(&safe_next(q.next.as_deref()))))
}

/// Close the server-side session, then drop the cookie. The token stops
/// working even if a copy of it survives the cookie.
#[utoipa::path(get, path = "/user/logout", tag = "user", responses((status = 303, description = "Signed out; session closed")))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Result<(CookieJar, Redirect), JsonApiError> {
    if let Some(token) = session_token(&headers, &jar) {
        state.auth.logout(&token).await?;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")))
}
