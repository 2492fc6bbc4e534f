//! Domain aggregates, services, and ports.
//!
//! Purpose: define the registration write-path and its consistency contract
//! independently of any transport or storage technology. Inbound adapters
//! translate HTTP requests into the driving ports exposed here; outbound
//! adapters implement the driven ports under [`ports`].

pub mod admin_review;
pub mod error;
pub mod owner;
pub mod ports;
pub mod registration;
pub mod registration_service;

pub use self::admin_review::AdminReviewService;
pub use self::error::{Error, ErrorCode};
pub use self::owner::{OwnerId, OwnerValidationError, Role};
pub use self::registration::{
    DesignFile, FileRef, MemberValidationError, Registration, RegistrationForm, RegistrationId,
    RegistrationStatus, StatusParseError, TeamMember, ALLOWED_DESIGN_FILE_TYPES,
    MAX_DESIGN_FILE_BYTES,
};
pub use self::registration_service::RegistrationService;

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
