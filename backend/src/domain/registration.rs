//! Registration aggregate and its value types.
//!
//! A [`Registration`] is the durable record for one team: the descriptive
//! form fields, the ordered member list, an optional design-file reference,
//! and a review status. There is at most one registration per owner.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::owner::OwnerId;

/// Maximum accepted design-file size in bytes (10 MiB).
pub const MAX_DESIGN_FILE_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for the uploaded design file.
pub const ALLOWED_DESIGN_FILE_TYPES: [&str; 3] =
    ["application/pdf", "image/jpeg", "image/png"];

/// Opaque identifier of a registration, assigned at first creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of a registration.
///
/// Only the admin review path transitions this state machine; an owner
/// re-submission leaves whatever status the organisers last set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Awaiting organiser review. The only status an owner save can produce,
    /// and only on the initial creation.
    Pending,
    /// Accepted for the derby.
    Approved,
    /// Declined by the organisers.
    Rejected,
}

impl RegistrationStatus {
    /// Stable string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a status string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown registration status: {value}")]
pub struct StatusParseError {
    /// The rejected input.
    pub value: String,
}

impl std::str::FromStr for RegistrationStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(StatusParseError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validation errors for [`TeamMember::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    /// The member name is empty after trimming.
    EmptyName,
    /// The member age is zero or negative.
    NonPositiveAge,
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "member name must not be empty"),
            Self::NonPositiveAge => write!(f, "member age must be a positive number"),
        }
    }
}

impl std::error::Error for MemberValidationError {}

/// One participant riding with the team.
///
/// Members are an ordered sequence owned by their registration; the order
/// carries display significance only. Each save replaces the set wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    name: String,
    age: i32,
}

impl TeamMember {
    /// Validate and construct a member.
    pub fn new(name: impl Into<String>, age: i32) -> Result<Self, MemberValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MemberValidationError::EmptyName);
        }
        if age < 1 {
            return Err(MemberValidationError::NonPositiveAge);
        }
        Ok(Self { name, age })
    }

    /// The member's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's age in years.
    pub fn age(&self) -> i32 {
        self.age
    }
}

/// Owner-mutable descriptive fields of a registration.
///
/// `status`, `created_at`, and the file reference deliberately do not appear
/// here: the form is exactly the field set an owner save may touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
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
}

impl RegistrationForm {
    /// The mandatory descriptive fields and their wire names, used by the
    /// pre-flight validation gate.
    pub fn mandatory_fields(&self) -> [(&'static str, &str); 9] {
        [
            ("teamName", &self.team_name),
            ("captainName", &self.captain_name),
            ("contactEmail", &self.contact_email),
            ("phoneNumber", &self.phone_number),
            ("ageRange", &self.age_range),
            ("soapboxName", &self.soapbox_name),
            ("designDescription", &self.design_description),
            ("dimensions", &self.dimensions),
            ("brakesSteering", &self.brakes_steering),
        ]
    }
}

/// Opaque handle to an uploaded design file in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

impl FileRef {
    /// Wrap a blob-store key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the underlying key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for a submitted design file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignFileError {
    /// The declared MIME type is not in [`ALLOWED_DESIGN_FILE_TYPES`].
    UnsupportedType { content_type: String },
    /// The payload exceeds [`MAX_DESIGN_FILE_BYTES`].
    TooLarge { size: usize },
    /// The payload is empty.
    Empty,
}

impl fmt::Display for DesignFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { content_type } => {
                write!(f, "unsupported design file type: {content_type}")
            }
            Self::TooLarge { size } => write!(
                f,
                "design file is {size} bytes; the limit is {MAX_DESIGN_FILE_BYTES}"
            ),
            Self::Empty => write!(f, "design file must not be empty"),
        }
    }
}

impl std::error::Error for DesignFileError {}

/// An uploaded design sketch or photo, pending storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl DesignFile {
    /// Construct a design file, enforcing the MIME and size limits before
    /// any upload is attempted.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, DesignFileError> {
        let content_type = content_type.into();
        if !ALLOWED_DESIGN_FILE_TYPES.contains(&content_type.as_str()) {
            return Err(DesignFileError::UnsupportedType { content_type });
        }
        if bytes.is_empty() {
            return Err(DesignFileError::Empty);
        }
        if bytes.len() > MAX_DESIGN_FILE_BYTES {
            return Err(DesignFileError::TooLarge { size: bytes.len() });
        }
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    /// The client-declared file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The declared MIME type, already checked against the allow-list.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The file payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension derived from the declared MIME type, used to build
    /// owner-scoped blob keys.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "application/pdf" => "pdf",
            "image/jpeg" => "jpg",
            _ => "png",
        }
    }
}

/// The durable record for one team and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub owner_id: OwnerId,
    pub form: RegistrationForm,
    pub members: Vec<TeamMember>,
    pub file_ref: Option<FileRef>,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Number of valid participants at the last save; always derived from
    /// the member set, never independently stored by the domain.
    pub fn participants_count(&self) -> usize {
        self.members.len()
    }
}
