//! Owner identity types.
//!
//! The portal never trusts a client-supplied identity: the session layer
//! resolves the authenticated owner and passes an [`OwnerId`] explicitly into
//! every domain call.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by [`OwnerId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerValidationError {
    /// The identifier is empty.
    EmptyId,
    /// The identifier is not a UUID.
    InvalidId,
}

impl fmt::Display for OwnerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "owner id must not be empty"),
            Self::InvalidId => write!(f, "owner id must be a valid UUID"),
        }
    }
}

impl std::error::Error for OwnerValidationError {}

/// Stable identity of the authenticated submitter, stored as a UUID.
///
/// At most one registration exists per owner; the id is the natural key for
/// the repository upsert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(Uuid, String);

impl OwnerId {
    /// Validate and construct an [`OwnerId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, OwnerValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`OwnerId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, OwnerValidationError> {
        if id.is_empty() {
            return Err(OwnerValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(OwnerValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| OwnerValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        let OwnerId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for OwnerId {
    type Error = OwnerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Role granted to a session by the auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A team captain registering for the derby.
    Competitor,
    /// An organiser reviewing applications.
    Admin,
}

impl Role {
    /// Stable string form stored in the session cookie.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Competitor => "competitor",
            Self::Admin => "admin",
        }
    }

    /// Parse the session cookie form back into a role.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "competitor" => Some(Self::Competitor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}
