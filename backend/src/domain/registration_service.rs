//! Registration submission service.
//!
//! This module implements the registration write-path as one logical
//! operation with defined partial-failure behaviour:
//!
//! 1. validate (fail fast, no side effects),
//! 2. resolve the owner's existing record,
//! 3. attach the design file at most once, strictly before any write,
//! 4. upsert the record and its member set (the only required-success step),
//! 5. notify best-effort, never failing the submission.
//!
//! A persisted record therefore always references an already-stored blob;
//! an upload orphaned by a later persistence failure is logged, not rolled
//! back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::owner::OwnerId;
use crate::domain::ports::{
    BlobKey, BlobStore, BlobStoreError, MemberSubmission, Notifier, RegistrationCommand,
    RegistrationDraft, RegistrationQuery, RegistrationRepository, RegistrationRepositoryError,
    SubmitRegistrationRequest, SubmitRegistrationResponse,
};
use crate::domain::registration::{DesignFile, FileRef, Registration, TeamMember};

/// Registration submission service implementing the driving ports.
///
/// Generic over its collaborators so tests inject mocks directly and the
/// server wires trait objects.
pub struct RegistrationService<R: ?Sized, B: ?Sized, N: ?Sized> {
    repository: Arc<R>,
    blob_store: Arc<B>,
    notifier: Arc<N>,
}

impl<R: ?Sized, B: ?Sized, N: ?Sized> RegistrationService<R, B, N> {
    /// Create a new service over the given collaborators.
    pub fn new(repository: Arc<R>, blob_store: Arc<B>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            blob_store,
            notifier,
        }
    }
}

impl<R: ?Sized, B: ?Sized, N: ?Sized> Clone for RegistrationService<R, B, N> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            blob_store: Arc::clone(&self.blob_store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

fn field_error(message: impl Into<String>, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn member_error(message: impl Into<String>, index: usize, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": "members",
        "index": index,
        "code": code,
    }))
}

/// Validate the submission and return the validated member set.
///
/// Performs every check before any collaborator is touched, so a rejected
/// submission has no side effects at all.
fn validate(request: &SubmitRegistrationRequest) -> Result<Vec<TeamMember>, Error> {
    if !request.form.terms_accepted {
        return Err(field_error(
            "the terms and conditions must be accepted",
            "termsAccepted",
            "terms_not_accepted",
        ));
    }

    for (field, value) in request.form.mandatory_fields() {
        if value.trim().is_empty() {
            return Err(field_error(
                format!("missing required field: {field}"),
                field,
                "missing_field",
            ));
        }
    }

    if request.members.is_empty() {
        return Err(field_error(
            "at least one team member is required",
            "members",
            "no_members",
        ));
    }

    request
        .members
        .iter()
        .enumerate()
        .map(|(index, member)| validate_member(index, member))
        .collect()
}

fn validate_member(index: usize, member: &MemberSubmission) -> Result<TeamMember, Error> {
    use crate::domain::registration::MemberValidationError;

    TeamMember::new(member.name.clone(), member.age).map_err(|err| match err {
        MemberValidationError::EmptyName => member_error(
            format!("member {} must have a name", index + 1),
            index,
            "empty_member_name",
        ),
        MemberValidationError::NonPositiveAge => member_error(
            format!("member {} must have a positive age", index + 1),
            index,
            "invalid_member_age",
        ),
    })
}

fn map_repository_error(error: RegistrationRepositoryError) -> Error {
    match error {
        RegistrationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("registration store unavailable: {message}"))
        }
        RegistrationRepositoryError::Query { message } => {
            Error::internal(format!("registration store error: {message}"))
        }
        RegistrationRepositoryError::DuplicateOwner { owner_id } => Error::conflict(format!(
            "a registration already exists for owner {owner_id}"
        )),
        RegistrationRepositoryError::NotFound { id } => {
            Error::not_found(format!("no registration with id {id}"))
        }
    }
}

fn map_blob_error(error: BlobStoreError) -> Error {
    let message = match &error {
        BlobStoreError::Unavailable { message } | BlobStoreError::Rejected { message } => message,
    };
    Error::service_unavailable(format!("uploading the design file failed: {message}"))
        .with_details(json!({ "step": "file_upload" }))
}

/// Build the owner-scoped blob key for an upload.
fn design_file_key(owner_id: &OwnerId, file: &DesignFile) -> Result<BlobKey, Error> {
    let key = format!(
        "{owner_id}/{stamp}.{ext}",
        stamp = Utc::now().timestamp_millis(),
        ext = file.extension()
    );
    BlobKey::new(key).map_err(|err| Error::internal(format!("invalid blob key: {err}")))
}

impl<R, B, N> RegistrationService<R, B, N>
where
    R: RegistrationRepository + ?Sized,
    B: BlobStore + ?Sized,
    N: Notifier + ?Sized,
{
    /// Upload the attachment, if any, returning the reference to persist.
    ///
    /// Without a new attachment the previous reference passes through
    /// unchanged, keeping a stored file sticky across updates.
    async fn resolve_file_ref(
        &self,
        owner_id: &OwnerId,
        attachment: Option<&DesignFile>,
        previous: Option<FileRef>,
    ) -> Result<Option<FileRef>, Error> {
        let Some(file) = attachment else {
            return Ok(previous);
        };

        let key = design_file_key(owner_id, file)?;
        let file_ref = self
            .blob_store
            .put(&key, file.content_type(), file.bytes())
            .await
            .map_err(map_blob_error)?;
        Ok(Some(file_ref))
    }

    /// Persist the draft, retrying exactly once when a concurrent first
    /// submission for the same owner wins the creation race.
    async fn upsert_with_retry(
        &self,
        owner_id: &OwnerId,
        draft: &RegistrationDraft,
    ) -> Result<Registration, Error> {
        match self.repository.upsert(owner_id, draft).await {
            Ok(registration) => Ok(registration),
            Err(RegistrationRepositoryError::DuplicateOwner { .. }) => {
                // The racing writer created the row; this retry takes the
                // update path of the same upsert.
                self.repository
                    .upsert(owner_id, draft)
                    .await
                    .map_err(map_repository_error)
            }
            Err(err) => Err(map_repository_error(err)),
        }
    }

    async fn notify(&self, registration: &Registration) -> bool {
        match self.notifier.send_confirmation(registration).await {
            Ok(()) => false,
            Err(err) => {
                warn!(
                    registration_id = %registration.id,
                    error = %err,
                    "registration confirmation could not be sent"
                );
                true
            }
        }
    }
}

#[async_trait]
impl<R, B, N> RegistrationCommand for RegistrationService<R, B, N>
where
    R: RegistrationRepository + ?Sized,
    B: BlobStore + ?Sized,
    N: Notifier + ?Sized,
{
    async fn submit(
        &self,
        request: SubmitRegistrationRequest,
    ) -> Result<SubmitRegistrationResponse, Error> {
        let members = validate(&request)?;

        let existing = self
            .repository
            .find_by_owner(&request.owner_id)
            .await
            .map_err(map_repository_error)?;
        let previous_ref = existing.and_then(|registration| registration.file_ref);

        let uploaded = request.attachment.is_some();
        let file_ref = self
            .resolve_file_ref(&request.owner_id, request.attachment.as_ref(), previous_ref)
            .await?;

        let draft = RegistrationDraft {
            form: request.form,
            members,
            file_ref,
        };

        let persisted = self.upsert_with_retry(&request.owner_id, &draft).await;
        let registration = match persisted {
            Ok(registration) => registration,
            Err(err) => {
                if uploaded {
                    if let Some(file_ref) = &draft.file_ref {
                        warn!(
                            owner_id = %request.owner_id,
                            file_ref = %file_ref,
                            "design file upload orphaned by failed persistence"
                        );
                    }
                }
                return Err(err);
            }
        };

        let notification_failed = self.notify(&registration).await;

        Ok(SubmitRegistrationResponse {
            registration,
            notification_failed,
        })
    }
}

#[async_trait]
impl<R, B, N> RegistrationQuery for RegistrationService<R, B, N>
where
    R: RegistrationRepository + ?Sized,
    B: BlobStore + ?Sized,
    N: Notifier + ?Sized,
{
    async fn find_own(&self, owner_id: &OwnerId) -> Result<Option<Registration>, Error> {
        self.repository
            .find_by_owner(owner_id)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
