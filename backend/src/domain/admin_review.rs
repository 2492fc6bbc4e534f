//! Admin review service over the registration repository.
//!
//! The review panel is a thin projection: listing is read-only and the only
//! mutation is the status transition, which the repository applies without
//! touching any owner-mutable field.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ports::{
    AdminRegistrations, RegistrationListQuery, RegistrationPage, RegistrationRepository,
    RegistrationRepositoryError,
};
use crate::domain::registration::{Registration, RegistrationId, RegistrationStatus};

/// Review service implementing the [`AdminRegistrations`] driving port.
pub struct AdminReviewService<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> AdminReviewService<R> {
    /// Create a new review service over the repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: ?Sized> Clone for AdminReviewService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
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

#[async_trait]
impl<R> AdminRegistrations for AdminReviewService<R>
where
    R: RegistrationRepository + ?Sized,
{
    async fn list(&self, query: &RegistrationListQuery) -> Result<RegistrationPage, Error> {
        self.repository
            .list(query)
            .await
            .map_err(map_repository_error)
    }

    async fn set_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<Registration, Error> {
        self.repository
            .set_status(id, status)
            .await
            .map_err(map_repository_error)
    }
}
