//! Registration API handlers for team captains.
//!
//! ```text
//! PUT /api/v1/registrations/me   Create or update the caller's registration
//! GET /api/v1/registrations/me   Fetch the caller's registration
//! ```
//!
//! The design file travels inside the JSON body as base64; decoding and the
//! size/type gate run before the domain service is called.

use actix_web::{HttpResponse, get, put, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{MemberSubmission, SubmitRegistrationRequest};
use crate::domain::registration::{
    DesignFile, DesignFileError, Registration, RegistrationForm,
};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// One team member on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
    #[schema(example = "Callum Henderson")]
    pub name: String,
    #[schema(example = 11)]
    pub age: i32,
}

/// Base64-encoded design file attachment.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentBody {
    #[schema(example = "soapbox-sketch.pdf")]
    pub file_name: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    /// Standard base64 encoding of the file payload.
    pub data_base64: String,
}

/// Registration submission body for `PUT /api/v1/registrations/me`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRegistrationBody {
    pub team_name: String,
    pub captain_name: String,
    pub contact_email: String,
    pub phone_number: String,
    pub age_range: String,
    pub soapbox_name: String,
    pub design_description: String,
    pub dimensions: String,
    pub brakes_steering: String,
    pub terms_accepted: bool,
    pub members: Vec<MemberBody>,
    #[serde(default)]
    pub attachment: Option<AttachmentBody>,
}

/// Registration as returned to its owner and to organisers.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub team_name: String,
    pub captain_name: String,
    pub contact_email: String,
    pub phone_number: String,
    pub age_range: String,
    pub soapbox_name: String,
    pub design_description: String,
    pub dimensions: String,
    pub brakes_steering: String,
    pub terms_accepted: bool,
    pub members: Vec<MemberBody>,
    pub participants_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ref: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        let participants_count = registration.participants_count();
        let members = registration
            .members
            .iter()
            .map(|member| MemberBody {
                name: member.name().to_owned(),
                age: member.age(),
            })
            .collect();
        Self {
            id: registration.id.to_string(),
            team_name: registration.form.team_name,
            captain_name: registration.form.captain_name,
            contact_email: registration.form.contact_email,
            phone_number: registration.form.phone_number,
            age_range: registration.form.age_range,
            soapbox_name: registration.form.soapbox_name,
            design_description: registration.form.design_description,
            dimensions: registration.form.dimensions,
            brakes_steering: registration.form.brakes_steering,
            terms_accepted: registration.form.terms_accepted,
            members,
            participants_count,
            file_ref: registration.file_ref.map(|file_ref| file_ref.as_str().to_owned()),
            status: registration.status.to_string(),
            created_at: registration.created_at,
            updated_at: registration.updated_at,
        }
    }
}

/// Submission outcome: the persisted registration plus the notification flag.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRegistrationResponseBody {
    pub registration: RegistrationResponse,
    /// True when the registration saved but the confirmation message did not
    /// go out.
    pub notification_failed: bool,
}

fn decode_attachment(attachment: AttachmentBody) -> Result<DesignFile, Error> {
    let bytes = BASE64.decode(attachment.data_base64.as_bytes()).map_err(|_| {
        Error::invalid_request("attachment payload is not valid base64").with_details(json!({
            "field": "attachment.dataBase64",
            "code": "invalid_base64",
        }))
    })?;
    DesignFile::new(attachment.file_name, attachment.content_type, bytes)
        .map_err(map_design_file_error)
}

fn map_design_file_error(err: DesignFileError) -> Error {
    let code = match &err {
        DesignFileError::UnsupportedType { .. } => "unsupported_file_type",
        DesignFileError::TooLarge { .. } => "file_too_large",
        DesignFileError::Empty => "empty_file",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": "attachment",
        "code": code,
    }))
}

fn into_domain_request(
    owner_id: crate::domain::OwnerId,
    body: SubmitRegistrationBody,
) -> Result<SubmitRegistrationRequest, Error> {
    let attachment = body.attachment.map(decode_attachment).transpose()?;
    let members = body
        .members
        .into_iter()
        .map(|member| MemberSubmission {
            name: member.name,
            age: member.age,
        })
        .collect();
    Ok(SubmitRegistrationRequest {
        owner_id,
        form: RegistrationForm {
            team_name: body.team_name,
            captain_name: body.captain_name,
            contact_email: body.contact_email,
            phone_number: body.phone_number,
            age_range: body.age_range,
            soapbox_name: body.soapbox_name,
            design_description: body.design_description,
            dimensions: body.dimensions,
            brakes_steering: body.brakes_steering,
            terms_accepted: body.terms_accepted,
        },
        members,
        attachment,
    })
}

/// Create or update the caller's registration.
///
/// The operation is an upsert keyed on the session identity: the first save
/// creates a pending registration, later saves update it in place without
/// touching its review status.
#[utoipa::path(
    put,
    path = "/api/v1/registrations/me",
    request_body = SubmitRegistrationBody,
    responses(
        (status = 200, description = "Registration saved", body = SubmitRegistrationResponseBody),
        (status = 400, description = "Invalid submission", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Submission raced another writer", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "submitRegistration"
)]
#[put("/registrations/me")]
pub async fn submit_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitRegistrationBody>,
) -> ApiResult<HttpResponse> {
    let owner_id = session.require_owner()?;
    let request = into_domain_request(owner_id, payload.into_inner())?;
    let outcome = state.registrations.submit(request).await?;
    Ok(HttpResponse::Ok().json(SubmitRegistrationResponseBody {
        registration: outcome.registration.into(),
        notification_failed: outcome.notification_failed,
    }))
}

/// Fetch the caller's registration.
#[utoipa::path(
    get,
    path = "/api/v1/registrations/me",
    responses(
        (status = 200, description = "The caller's registration", body = RegistrationResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No registration yet", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "ownRegistration"
)]
#[get("/registrations/me")]
pub async fn own_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RegistrationResponse>> {
    let owner_id = session.require_owner()?;
    let registration = state
        .registrations_query
        .find_own(&owner_id)
        .await?
        .ok_or_else(|| Error::not_found("no registration for this owner"))?;
    Ok(web::Json(registration.into()))
}
