//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! endpoint from the inbound layer, the request and response schemas, and
//! the session cookie security scheme. The generated document backs Swagger
//! UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::admin::{RegistrationListResponse, StatusUpdateBody};
use crate::inbound::http::registrations::{
    AttachmentBody, MemberBody, RegistrationResponse, SubmitRegistrationBody,
    SubmitRegistrationResponseBody,
};
use crate::inbound::http::users::{CurrentUserResponse, LoginRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the registration portal REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Soapbox derby registration API",
        description = "Team registration submission and organiser review for the derby."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::registrations::submit_registration,
        crate::inbound::http::registrations::own_registration,
        crate::inbound::http::admin::list_registrations,
        crate::inbound::http::admin::set_registration_status,
        crate::inbound::http::admin::export_registrations,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        CurrentUserResponse,
        MemberBody,
        AttachmentBody,
        SubmitRegistrationBody,
        RegistrationResponse,
        SubmitRegistrationResponseBody,
        RegistrationListResponse,
        StatusUpdateBody,
    )),
    tags(
        (name = "users", description = "Login, logout, and session identity"),
        (name = "registrations", description = "Owner registration submission and retrieval"),
        (name = "admin", description = "Organiser review of submitted registrations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
