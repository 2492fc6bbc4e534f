//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{team_members, team_registrations};

/// Row struct for reading from the team_registrations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = team_registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: Uuid,
    pub owner_id: Uuid,
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
    pub file_ref: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the creation path of the upsert.
///
/// `created_at` and `updated_at` are omitted so the database defaults apply.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = team_registrations)]
pub(crate) struct NewRegistrationRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub team_name: &'a str,
    pub captain_name: &'a str,
    pub contact_email: &'a str,
    pub phone_number: &'a str,
    pub age_range: &'a str,
    pub soapbox_name: &'a str,
    pub design_description: &'a str,
    pub dimensions: &'a str,
    pub brakes_steering: &'a str,
    pub terms_accepted: bool,
    pub file_ref: Option<&'a str>,
    pub status: &'a str,
}

/// Changeset for the update path of the upsert.
///
/// `status` and `created_at` deliberately have no field here: the owner save
/// can never touch them. `file_ref` being `None` skips the column, which is
/// what keeps a stored reference sticky.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = team_registrations)]
pub(crate) struct RegistrationUpdate<'a> {
    pub team_name: &'a str,
    pub captain_name: &'a str,
    pub contact_email: &'a str,
    pub phone_number: &'a str,
    pub age_range: &'a str,
    pub soapbox_name: &'a str,
    pub design_description: &'a str,
    pub dimensions: &'a str,
    pub brakes_steering: &'a str,
    pub terms_accepted: bool,
    pub file_ref: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the team_members table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    #[expect(dead_code, reason = "selected for completeness, keyed by position")]
    pub id: Uuid,
    pub registration_id: Uuid,
    pub position: i32,
    pub name: String,
    pub age: i32,
}

/// Insertable struct for the wholesale member replacement.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = team_members)]
pub(crate) struct NewMemberRow<'a> {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub position: i32,
    pub name: &'a str,
    pub age: i32,
}
