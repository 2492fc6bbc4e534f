//! Persistence port for registrations and their members.
//!
//! The repository owns the uniqueness contract (at most one registration per
//! owner) and the atomicity contract (a parent update and its member
//! replacement are observed together or not at all).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::owner::OwnerId;
use crate::domain::registration::{
    FileRef, Registration, RegistrationForm, RegistrationId, RegistrationStatus, TeamMember,
};

/// Errors raised by registration repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationRepositoryError {
    /// The backing store is unreachable or timing out; retryable.
    #[error("registration store unavailable: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("registration store query failed: {message}")]
    Query { message: String },
    /// Two first-submissions for the same owner raced; the caller must retry
    /// the upsert, which will then take the update path.
    #[error("a registration already exists for owner {owner_id}")]
    DuplicateOwner { owner_id: String },
    /// No registration with the given identifier exists.
    #[error("no registration with id {id}")]
    NotFound { id: String },
}

impl RegistrationRepositoryError {
    /// Helper for connectivity failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for the creation-race signal.
    pub fn duplicate_owner(owner_id: impl Into<String>) -> Self {
        Self::DuplicateOwner {
            owner_id: owner_id.into(),
        }
    }

    /// Helper for missing registrations.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

/// Everything an owner save may change, plus the validated member set.
///
/// `file_ref` semantics: `Some` sets the stored reference to the freshly
/// uploaded blob; `None` leaves any existing reference untouched. A stored
/// reference is therefore sticky and can never be cleared by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub form: RegistrationForm,
    pub members: Vec<TeamMember>,
    pub file_ref: Option<FileRef>,
}

/// Sortable columns of the admin projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    TeamName,
    CaptainName,
    CreatedAt,
}

/// Sort order of the admin projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Read-only query over all registrations for the admin review table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationListQuery {
    /// Case-insensitive substring match over team name, captain name, and
    /// contact email. `None` returns everything.
    pub search: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for RegistrationListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_field: SortField::CreatedAt,
            sort_direction: SortDirection::Desc,
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of the admin projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPage {
    pub items: Vec<Registration>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl RegistrationPage {
    /// Total number of pages implied by `total` and `page_size`.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}

/// Port for registration storage and retrieval.
///
/// # Upsert contract
///
/// - No registration for the owner: create one with `status = pending` and
///   a fresh `created_at`.
/// - A registration exists: update the owner-mutable fields and
///   `updated_at` only. `status` and `created_at` are never written by the
///   update path, whatever the draft contains.
/// - The parent write and the wholesale member replacement are atomic: a
///   concurrent reader observes either the old record with its old members
///   or the new record with its new members.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Fetch the single registration for an owner, members included.
    async fn find_by_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError>;

    /// Create-or-update the owner's registration from the draft.
    async fn upsert(
        &self,
        owner_id: &OwnerId,
        draft: &RegistrationDraft,
    ) -> Result<Registration, RegistrationRepositoryError>;

    /// Admin-only status mutation; touches `status` and `updated_at` and
    /// nothing else.
    async fn set_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<Registration, RegistrationRepositoryError>;

    /// Consistent snapshot of all registrations for the admin view.
    async fn list(
        &self,
        query: &RegistrationListQuery,
    ) -> Result<RegistrationPage, RegistrationRepositoryError>;
}

/// Fixture implementation for running without a database.
///
/// Lookups find nothing, upserts echo a pending registration built from the
/// draft, and the admin projection is empty. Use it in tests where the
/// repository is not under test and in the server's no-database mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistrationRepository;

#[async_trait]
impl RegistrationRepository for FixtureRegistrationRepository {
    async fn find_by_owner(
        &self,
        _owner_id: &OwnerId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        Ok(None)
    }

    async fn upsert(
        &self,
        owner_id: &OwnerId,
        draft: &RegistrationDraft,
    ) -> Result<Registration, RegistrationRepositoryError> {
        let now = chrono::Utc::now();
        Ok(Registration {
            id: RegistrationId::random(),
            owner_id: owner_id.clone(),
            form: draft.form.clone(),
            members: draft.members.clone(),
            file_ref: draft.file_ref.clone(),
            status: RegistrationStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    async fn set_status(
        &self,
        id: &RegistrationId,
        _status: RegistrationStatus,
    ) -> Result<Registration, RegistrationRepositoryError> {
        Err(RegistrationRepositoryError::not_found(id.to_string()))
    }

    async fn list(
        &self,
        query: &RegistrationListQuery,
    ) -> Result<RegistrationPage, RegistrationRepositoryError> {
        Ok(RegistrationPage {
            items: Vec::new(),
            total: 0,
            page: query.page,
            page_size: query.page_size,
        })
    }
}
