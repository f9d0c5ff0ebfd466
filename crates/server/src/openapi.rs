use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub status: u16, pub title: String, pub detail: String }

/// Form or JSON body of `POST /user/register`; `allow` must be `"on"`.
#[derive(ToSchema)]
pub struct RegisterRequest { pub user_name: String, pub pwd: String, pub email: String, pub allow: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub pwd: String, pub remember: Option<String> }

#[derive(ToSchema)]
pub struct AddressRequest { pub receiver: String, pub addr: String, pub zip_code: Option<String>, pub phone: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::user::register,
        crate::routes::user::activate,
        crate::routes::user::login_page,
        crate::routes::user::login,
        crate::routes::user::logout,
        crate::routes::center::info,
        crate::routes::center::orders,
        crate::routes::center::address,
        crate::routes::center::add_address,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            RegisterRequest,
            LoginRequest,
            AddressRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "user"),
        (name = "center")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_user_center_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/user/register", "/user/login", "/user/logout", "/user/order/{page}", "/user/address"] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
    }
}
