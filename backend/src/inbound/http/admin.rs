//! Admin review API handlers for organisers.
//!
//! ```text
//! GET /api/v1/admin/registrations                 List with search/sort/paging
//! PUT /api/v1/admin/registrations/{id}/status     Approve or reject
//! GET /api/v1/admin/registrations/export          CSV download
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{RegistrationListQuery, SortDirection, SortField};
use crate::domain::registration::{Registration, RegistrationId, RegistrationStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::registrations::RegistrationResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const MAX_PAGE_SIZE: u32 = 100;
const EXPORT_PAGE_SIZE: u32 = 100;

/// Query parameters accepted by the admin list endpoint.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Case-insensitive substring match over team name, captain, and email.
    pub search: Option<String>,
    pub sort_field: Option<SortField>,
    pub sort_direction: Option<SortDirection>,
    /// 1-based page number.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListParams {
    fn into_query(self) -> RegistrationListQuery {
        let defaults = RegistrationListQuery::default();
        RegistrationListQuery {
            search: self
                .search
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty()),
            sort_field: self.sort_field.unwrap_or(defaults.sort_field),
            sort_direction: self.sort_direction.unwrap_or(defaults.sort_direction),
            page: self.page.unwrap_or(defaults.page).max(1),
            page_size: self
                .page_size
                .unwrap_or(defaults.page_size)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// One page of registrations for the review table.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationListResponse {
    pub items: Vec<RegistrationResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

/// Status update body for `PUT /api/v1/admin/registrations/{id}/status`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateBody {
    /// `pending`, `approved`, or `rejected`.
    #[schema(example = "approved")]
    pub status: String,
}

/// List registrations for review.
#[utoipa::path(
    get,
    path = "/api/v1/admin/registrations",
    params(ListParams),
    responses(
        (status = 200, description = "One page of registrations", body = RegistrationListResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Organiser access required", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listRegistrations"
)]
#[get("/admin/registrations")]
pub async fn list_registrations(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<ListParams>,
) -> ApiResult<web::Json<RegistrationListResponse>> {
    session.require_admin()?;
    let query = params.into_inner().into_query();
    let page = state.admin.list(&query).await?;
    let total_pages = page.total_pages();
    Ok(web::Json(RegistrationListResponse {
        items: page.items.into_iter().map(Into::into).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages,
    }))
}

fn parse_registration_id(raw: &str) -> Result<RegistrationId, Error> {
    Uuid::parse_str(raw).map(RegistrationId::from_uuid).map_err(|_| {
        Error::invalid_request("registration id must be a valid UUID").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_uuid",
        }))
    })
}

fn parse_status(raw: &str) -> Result<RegistrationStatus, Error> {
    RegistrationStatus::from_str(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "status",
            "value": raw,
            "code": "invalid_status",
        }))
    })
}

/// Set the review status of a registration.
#[utoipa::path(
    put,
    path = "/api/v1/admin/registrations/{id}/status",
    request_body = StatusUpdateBody,
    params(
        ("id" = String, Path, description = "Registration identifier")
    ),
    responses(
        (status = 200, description = "Updated registration", body = RegistrationResponse),
        (status = 400, description = "Invalid id or status", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Organiser access required", body = Error),
        (status = 404, description = "No such registration", body = Error)
    ),
    tags = ["admin"],
    operation_id = "setRegistrationStatus"
)]
#[put("/admin/registrations/{id}/status")]
pub async fn set_registration_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateBody>,
) -> ApiResult<web::Json<RegistrationResponse>> {
    session.require_admin()?;
    let id = parse_registration_id(&path)?;
    let status = parse_status(&payload.status)?;
    let registration = state.admin.set_status(&id, status).await?;
    Ok(web::Json(registration.into()))
}

const CSV_HEADER: &str = "Team Name,Captain,Email,Phone,Age Range,Soapbox Name,Participants,Status,Submitted\r\n";

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row(registration: &Registration) -> String {
    let fields = [
        csv_field(&registration.form.team_name),
        csv_field(&registration.form.captain_name),
        csv_field(&registration.form.contact_email),
        csv_field(&registration.form.phone_number),
        csv_field(&registration.form.age_range),
        csv_field(&registration.form.soapbox_name),
        registration.participants_count().to_string(),
        csv_field(registration.status.as_str()),
        csv_field(&registration.created_at.to_rfc3339()),
    ];
    let mut row = fields.join(",");
    row.push_str("\r\n");
    row
}

/// Export every registration as CSV.
///
/// Pages through the repository snapshot so the export stays bounded in
/// memory per request.
#[utoipa::path(
    get,
    path = "/api/v1/admin/registrations/export",
    responses(
        (status = 200, description = "CSV export of all registrations", content_type = "text/csv"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Organiser access required", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "exportRegistrations"
)]
#[get("/admin/registrations/export")]
pub async fn export_registrations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;

    let mut csv = String::from(CSV_HEADER);
    let mut query = RegistrationListQuery {
        page_size: EXPORT_PAGE_SIZE,
        ..RegistrationListQuery::default()
    };
    loop {
        let page = state.admin.list(&query).await?;
        for registration in &page.items {
            csv.push_str(&csv_row(registration));
        }
        if u64::from(query.page) >= page.total_pages() {
            break;
        }
        query.page += 1;
    }

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"registrations.csv\"",
        ))
        .body(csv))
}
