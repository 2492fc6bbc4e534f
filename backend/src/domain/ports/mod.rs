//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports ([`RegistrationRepository`], [`BlobStore`], [`Notifier`],
//! [`AuthProvider`]) describe how the domain reaches storage, files, mail,
//! and identity. Driving ports ([`RegistrationCommand`],
//! [`RegistrationQuery`], [`AdminRegistrations`]) are the use-cases inbound
//! adapters call. Every port exposes strongly typed errors so adapters map
//! their failures into predictable variants, and ships a `Fixture*`
//! implementation for tests and for running without infrastructure.

mod admin_registrations;
mod auth_provider;
mod blob_store;
mod notifier;
mod registration_command;
mod registration_query;
mod registration_repository;

#[cfg(test)]
pub use admin_registrations::MockAdminRegistrations;
pub use admin_registrations::{AdminRegistrations, FixtureAdminRegistrations};
#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{
    AuthProvider, AuthProviderError, AuthenticatedUser, Credentials, FixtureAuthProvider,
};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobKey, BlobKeyValidationError, BlobStore, BlobStoreError, FixtureBlobStore};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{FixtureNotifier, Notifier, NotifierError};
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{
    FixtureRegistrationCommand, MemberSubmission, RegistrationCommand, SubmitRegistrationRequest,
    SubmitRegistrationResponse,
};
#[cfg(test)]
pub use registration_query::MockRegistrationQuery;
pub use registration_query::{FixtureRegistrationQuery, RegistrationQuery};
#[cfg(test)]
pub use registration_repository::MockRegistrationRepository;
pub use registration_repository::{
    FixtureRegistrationRepository, RegistrationDraft, RegistrationListQuery, RegistrationPage,
    RegistrationRepository, RegistrationRepositoryError, SortDirection, SortField,
};
