//! Outbound notification port.
//!
//! Notification is the one best-effort step of a submission: the service
//! records a failure here on the response instead of failing the operation.

use async_trait::async_trait;

use crate::domain::registration::Registration;

/// Errors surfaced by notifier adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifierError {
    /// The message could not be composed or handed to the relay.
    #[error("failed to send registration notification: {message}")]
    Send { message: String },
}

impl NotifierError {
    /// Helper for send failures.
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send {
            message: message.into(),
        }
    }
}

/// Port for dispatching the registration confirmation message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a confirmation for the given registration, members included.
    async fn send_confirmation(&self, registration: &Registration) -> Result<(), NotifierError>;
}

/// Fixture implementation that drops notifications on the floor.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn send_confirmation(&self, _registration: &Registration) -> Result<(), NotifierError> {
        Ok(())
    }
}
