//! Session API handlers.
//!
//! ```text
//! POST /api/v1/login  {"username":"moira","password":"secret"}
//! POST /api/v1/logout
//! GET  /api/v1/users/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{AuthProviderError, Credentials};
use crate::domain::{Error, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Identity of the authenticated caller.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    /// Stable owner identifier backing the registration upsert.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
    /// Granted role, `competitor` or `admin`.
    #[schema(example = "competitor")]
    pub role: String,
}

fn validate_login(payload: &LoginRequest) -> Result<Credentials, Error> {
    if payload.username.trim().is_empty() {
        return Err(Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })));
    }
    if payload.password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })));
    }
    Ok(Credentials {
        username: payload.username.clone(),
        password: payload.password.clone(),
    })
}

fn map_auth_error(err: AuthProviderError) -> Error {
    match err {
        AuthProviderError::InvalidCredentials => Error::unauthorized("invalid credentials"),
        AuthProviderError::Unavailable { message } => {
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
    }
}

/// Authenticate the caller and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = CurrentUserResponse, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = validate_login(&payload)?;
    let user = state
        .auth
        .authenticate(&credentials)
        .await
        .map_err(map_auth_error)?;
    session.persist_identity(&user)?;
    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        user_id: user.owner_id.to_string(),
        role: user.role.as_str().to_owned(),
    }))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Return the authenticated caller's identity.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current identity", body = CurrentUserResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(session: SessionContext) -> ApiResult<web::Json<CurrentUserResponse>> {
    let owner_id = session.require_owner()?;
    let role = session.role()?.unwrap_or(Role::Competitor);
    Ok(web::Json(CurrentUserResponse {
        user_id: owner_id.to_string(),
        role: role.as_str().to_owned(),
    }))
}
