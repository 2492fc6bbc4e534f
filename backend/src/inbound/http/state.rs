//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data`, so they depend on
//! domain ports only and stay testable without infrastructure.

use std::sync::Arc;

use crate::domain::ports::{
    AdminRegistrations, AuthProvider, FixtureAdminRegistrations, FixtureAuthProvider,
    FixtureRegistrationCommand, FixtureRegistrationQuery, RegistrationCommand, RegistrationQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthProvider>,
    pub registrations: Arc<dyn RegistrationCommand>,
    pub registrations_query: Arc<dyn RegistrationQuery>,
    pub admin: Arc<dyn AdminRegistrations>,
}

impl HttpState {
    /// State wired entirely with fixture ports, for tests and for running
    /// the server without infrastructure.
    ///
    /// # Examples
    /// ```
    /// use derby_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::fixture();
    /// let _auth = state.auth.clone();
    /// ```
    pub fn fixture() -> Self {
        Self {
            auth: Arc::new(FixtureAuthProvider),
            registrations: Arc::new(FixtureRegistrationCommand),
            registrations_query: Arc::new(FixtureRegistrationQuery),
            admin: Arc::new(FixtureAdminRegistrations),
        }
    }
}
