//! PostgreSQL-backed `RegistrationRepository` implementation using Diesel.
//!
//! The upsert conflicts on the `owner_id` unique constraint so the creation
//! and update paths are a single statement, and the parent write plus the
//! wholesale member replacement run inside one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::owner::OwnerId;
use crate::domain::ports::{
    RegistrationDraft, RegistrationListQuery, RegistrationPage, RegistrationRepository,
    RegistrationRepositoryError, SortDirection, SortField,
};
use crate::domain::registration::{
    FileRef, Registration, RegistrationForm, RegistrationId, RegistrationStatus, TeamMember,
};

use super::models::{MemberRow, NewMemberRow, NewRegistrationRow, RegistrationRow, RegistrationUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{team_members, team_registrations};

/// Diesel-backed implementation of the `RegistrationRepository` port.
#[derive(Clone)]
pub struct DieselRegistrationRepository {
    pool: DbPool,
}

impl DieselRegistrationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain registration repository errors.
fn map_pool_error(error: PoolError) -> RegistrationRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RegistrationRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain registration repository errors.
fn map_diesel_error(error: diesel::result::Error) -> RegistrationRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RegistrationRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RegistrationRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => RegistrationRepositoryError::query("database error"),
        _ => RegistrationRepositoryError::query("database error"),
    }
}

/// Map write errors, turning a unique violation into the creation-race
/// signal for the caller to retry.
fn map_write_error(owner_id: &OwnerId, error: diesel::result::Error) -> RegistrationRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if matches!(
        &error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ) {
        return RegistrationRepositoryError::duplicate_owner(owner_id.to_string());
    }
    map_diesel_error(error)
}

fn member_rows_to_domain(rows: Vec<MemberRow>) -> Result<Vec<TeamMember>, RegistrationRepositoryError> {
    rows.into_iter()
        .map(|row| {
            TeamMember::new(row.name, row.age).map_err(|err| {
                RegistrationRepositoryError::query(format!("invalid member row: {err}"))
            })
        })
        .collect()
}

/// Convert a database row and its members to a domain registration.
fn row_to_registration(
    row: RegistrationRow,
    members: Vec<TeamMember>,
) -> Result<Registration, RegistrationRepositoryError> {
    let status: RegistrationStatus = row.status.parse().map_err(|_| {
        RegistrationRepositoryError::query(format!("invalid status value: {}", row.status))
    })?;

    Ok(Registration {
        id: RegistrationId::from_uuid(row.id),
        owner_id: OwnerId::from_uuid(row.owner_id),
        form: RegistrationForm {
            team_name: row.team_name,
            captain_name: row.captain_name,
            contact_email: row.contact_email,
            phone_number: row.phone_number,
            age_range: row.age_range,
            soapbox_name: row.soapbox_name,
            design_description: row.design_description,
            dimensions: row.dimensions,
            brakes_steering: row.brakes_steering,
            terms_accepted: row.terms_accepted,
        },
        members,
        file_ref: row.file_ref.map(FileRef::new),
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn search_pattern(search: &str) -> String {
    format!("%{search}%")
}

async fn load_members_for<C>(
    conn: &mut C,
    registration_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<MemberRow>>, diesel::result::Error>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let rows: Vec<MemberRow> = team_members::table
        .filter(team_members::registration_id.eq_any(registration_ids))
        .order(team_members::position.asc())
        .select(MemberRow::as_select())
        .load(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<MemberRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.registration_id).or_default().push(row);
    }
    Ok(grouped)
}

#[async_trait]
impl RegistrationRepository for DieselRegistrationRepository {
    async fn find_by_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RegistrationRow> = team_registrations::table
            .filter(team_registrations::owner_id.eq(owner_id.as_uuid()))
            .select(RegistrationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut members_by_registration = load_members_for(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        let members =
            member_rows_to_domain(members_by_registration.remove(&row.id).unwrap_or_default())?;
        row_to_registration(row, members).map(Some)
    }

    async fn upsert(
        &self,
        owner_id: &OwnerId,
        draft: &RegistrationDraft,
    ) -> Result<Registration, RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewRegistrationRow {
            id: Uuid::new_v4(),
            owner_id: *owner_id.as_uuid(),
            team_name: &draft.form.team_name,
            captain_name: &draft.form.captain_name,
            contact_email: &draft.form.contact_email,
            phone_number: &draft.form.phone_number,
            age_range: &draft.form.age_range,
            soapbox_name: &draft.form.soapbox_name,
            design_description: &draft.form.design_description,
            dimensions: &draft.form.dimensions,
            brakes_steering: &draft.form.brakes_steering,
            terms_accepted: draft.form.terms_accepted,
            file_ref: draft.file_ref.as_ref().map(FileRef::as_str),
            status: RegistrationStatus::Pending.as_str(),
        };
        let update = RegistrationUpdate {
            team_name: &draft.form.team_name,
            captain_name: &draft.form.captain_name,
            contact_email: &draft.form.contact_email,
            phone_number: &draft.form.phone_number,
            age_range: &draft.form.age_range,
            soapbox_name: &draft.form.soapbox_name,
            design_description: &draft.form.design_description,
            dimensions: &draft.form.dimensions,
            brakes_steering: &draft.form.brakes_steering,
            terms_accepted: draft.form.terms_accepted,
            file_ref: draft.file_ref.as_ref().map(FileRef::as_str),
            updated_at: Utc::now(),
        };
        let members = &draft.members;

        let row = conn
            .transaction::<RegistrationRow, diesel::result::Error, _>(|conn| {
                async move {
                    let row: RegistrationRow = diesel::insert_into(team_registrations::table)
                        .values(&new_row)
                        .on_conflict(team_registrations::owner_id)
                        .do_update()
                        .set(&update)
                        .returning(RegistrationRow::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::delete(
                        team_members::table
                            .filter(team_members::registration_id.eq(row.id)),
                    )
                    .execute(conn)
                    .await?;

                    let member_rows: Vec<NewMemberRow<'_>> = members
                        .iter()
                        .enumerate()
                        .map(|(position, member)| NewMemberRow {
                            id: Uuid::new_v4(),
                            registration_id: row.id,
                            position: i32::try_from(position).unwrap_or(i32::MAX),
                            name: member.name(),
                            age: member.age(),
                        })
                        .collect();
                    if !member_rows.is_empty() {
                        diesel::insert_into(team_members::table)
                            .values(&member_rows)
                            .execute(conn)
                            .await?;
                    }

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_write_error(owner_id, err))?;

        row_to_registration(row, draft.members.clone())
    }

    async fn set_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<Registration, RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RegistrationRow> = diesel::update(
            team_registrations::table.filter(team_registrations::id.eq(id.as_uuid())),
        )
        .set((
            team_registrations::status.eq(status.as_str()),
            team_registrations::updated_at.eq(Utc::now()),
        ))
        .returning(RegistrationRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Err(RegistrationRepositoryError::not_found(id.to_string()));
        };

        let mut members_by_registration = load_members_for(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        let members =
            member_rows_to_domain(members_by_registration.remove(&row.id).unwrap_or_default())?;
        row_to_registration(row, members)
    }

    async fn list(
        &self,
        query: &RegistrationListQuery,
    ) -> Result<RegistrationPage, RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = match &query.search {
            Some(search) => {
                let pattern = search_pattern(search);
                team_registrations::table
                    .filter(
                        team_registrations::team_name
                            .ilike(pattern.clone())
                            .or(team_registrations::captain_name.ilike(pattern.clone()))
                            .or(team_registrations::contact_email.ilike(pattern)),
                    )
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            None => {
                team_registrations::table
                    .count()
                    .get_result(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        let mut select = team_registrations::table
            .select(RegistrationRow::as_select())
            .into_boxed();
        if let Some(search) = &query.search {
            let pattern = search_pattern(search);
            select = select.filter(
                team_registrations::team_name
                    .ilike(pattern.clone())
                    .or(team_registrations::captain_name.ilike(pattern.clone()))
                    .or(team_registrations::contact_email.ilike(pattern)),
            );
        }
        select = match (query.sort_field, query.sort_direction) {
            (SortField::TeamName, SortDirection::Asc) => {
                select.order(team_registrations::team_name.asc())
            }
            (SortField::TeamName, SortDirection::Desc) => {
                select.order(team_registrations::team_name.desc())
            }
            (SortField::CaptainName, SortDirection::Asc) => {
                select.order(team_registrations::captain_name.asc())
            }
            (SortField::CaptainName, SortDirection::Desc) => {
                select.order(team_registrations::captain_name.desc())
            }
            (SortField::CreatedAt, SortDirection::Asc) => {
                select.order(team_registrations::created_at.asc())
            }
            (SortField::CreatedAt, SortDirection::Desc) => {
                select.order(team_registrations::created_at.desc())
            }
        };

        let page = query.page.max(1);
        let offset = i64::from(page - 1) * i64::from(query.page_size);
        let rows: Vec<RegistrationRow> = select
            .limit(i64::from(query.page_size))
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut members_by_registration = load_members_for(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(|row| {
                let members = member_rows_to_domain(
                    members_by_registration.remove(&row.id).unwrap_or_default(),
                )?;
                row_to_registration(row, members)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = u64::try_from(total).unwrap_or(0);
        Ok(RegistrationPage {
            items,
            total,
            page,
            page_size: query.page_size,
        })
    }
}
