//! Driving port for the owner dashboard read path.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::owner::OwnerId;
use crate::domain::registration::Registration;

/// Use-case port: fetch the caller's own registration, if any.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationQuery: Send + Sync {
    /// Return the registration owned by `owner_id`, members included.
    async fn find_own(&self, owner_id: &OwnerId) -> Result<Option<Registration>, Error>;
}

/// Fixture implementation reporting no registration.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistrationQuery;

#[async_trait]
impl RegistrationQuery for FixtureRegistrationQuery {
    async fn find_own(&self, _owner_id: &OwnerId) -> Result<Option<Registration>, Error> {
        Ok(None)
    }
}
