//! Identity port.
//!
//! Sign-in, sign-up, and password management live outside this system; the
//! portal only needs a collaborator that exchanges credentials for a stable
//! owner identity and a role. The session layer stores the result.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::owner::{OwnerId, Role};

/// Opaque credentials forwarded to the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The identity a successful authentication resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub owner_id: OwnerId,
    pub role: Role,
}

/// Errors surfaced by identity adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthProviderError {
    /// The credentials did not match a known identity.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The identity collaborator is unreachable.
    #[error("identity provider unavailable: {message}")]
    Unavailable { message: String },
}

impl AuthProviderError {
    /// Helper for provider outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Port for resolving credentials to an authenticated identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate the supplied credentials.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, AuthProviderError>;
}

/// Development fixture: accepts any non-empty credentials.
///
/// The owner id is derived deterministically from the username so repeated
/// logins resolve to the same registration, and usernames prefixed with
/// `admin` receive the organiser role. Never wire this into production.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthProvider;

#[async_trait]
impl AuthProvider for FixtureAuthProvider {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, AuthProviderError> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthProviderError::InvalidCredentials);
        }
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, credentials.username.as_bytes());
        let role = if credentials.username.starts_with("admin") {
            Role::Admin
        } else {
            Role::Competitor
        };
        Ok(AuthenticatedUser {
            owner_id: OwnerId::from_uuid(uuid),
            role,
        })
    }
}
