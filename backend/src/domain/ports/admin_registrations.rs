//! Driving port for the admin review panel.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::registration::{Registration, RegistrationId, RegistrationStatus};

use super::registration_repository::{RegistrationListQuery, RegistrationPage};

/// Use-case port: list registrations and mutate their review status.
///
/// This is the only path allowed to transition the status state machine;
/// admins may re-set any of the three statuses freely.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRegistrations: Send + Sync {
    /// A consistent snapshot of registrations matching the query.
    async fn list(&self, query: &RegistrationListQuery) -> Result<RegistrationPage, Error>;

    /// Set the review status of one registration.
    async fn set_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<Registration, Error>;
}

/// Fixture implementation with an empty review queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAdminRegistrations;

#[async_trait]
impl AdminRegistrations for FixtureAdminRegistrations {
    async fn list(&self, query: &RegistrationListQuery) -> Result<RegistrationPage, Error> {
        Ok(RegistrationPage {
            items: Vec::new(),
            total: 0,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn set_status(
        &self,
        id: &RegistrationId,
        _status: RegistrationStatus,
    ) -> Result<Registration, Error> {
        Err(Error::not_found(format!("no registration with id {id}")))
    }
}
