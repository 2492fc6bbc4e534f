//! Builders selecting real or fixture adapters for each domain port.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    AdminRegistrations, BlobStore, FixtureAuthProvider, FixtureBlobStore, FixtureNotifier,
    FixtureRegistrationRepository, Notifier, RegistrationCommand, RegistrationQuery,
    RegistrationRepository,
};
use crate::domain::{AdminReviewService, RegistrationService};
use crate::inbound::http::state::HttpState;
use crate::outbound::email::SmtpNotifier;
use crate::outbound::persistence::DieselRegistrationRepository;
use crate::outbound::storage::FsBlobStore;

use super::ServerConfig;

fn build_repository(config: &ServerConfig) -> Arc<dyn RegistrationRepository> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselRegistrationRepository::new(pool.clone())),
        None => Arc::new(FixtureRegistrationRepository),
    }
}

fn build_blob_store(config: &ServerConfig) -> std::io::Result<Arc<dyn BlobStore>> {
    match &config.blob_root {
        Some(root) => {
            let store = FsBlobStore::open(root)
                .map_err(|err| std::io::Error::other(format!("blob store init failed: {err}")))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(FixtureBlobStore)),
    }
}

fn build_notifier(config: &ServerConfig) -> std::io::Result<Arc<dyn Notifier>> {
    match config.smtp.clone() {
        Some(smtp) => {
            let notifier = SmtpNotifier::new(smtp)
                .map_err(|err| std::io::Error::other(format!("smtp init failed: {err}")))?;
            Ok(Arc::new(notifier))
        }
        None => Ok(Arc::new(FixtureNotifier)),
    }
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
///
/// Each port is selected independently: a deployment can run with a real
/// database but fixture mail, or entirely on fixtures for local work.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let repository = build_repository(config);
    let blob_store = build_blob_store(config)?;
    let notifier = build_notifier(config)?;

    let service = Arc::new(RegistrationService::new(
        Arc::clone(&repository),
        blob_store,
        notifier,
    ));
    let admin = Arc::new(AdminReviewService::new(repository));

    Ok(web::Data::new(HttpState {
        auth: Arc::new(FixtureAuthProvider),
        registrations: Arc::clone(&service) as Arc<dyn RegistrationCommand>,
        registrations_query: service as Arc<dyn RegistrationQuery>,
        admin: admin as Arc<dyn AdminRegistrations>,
    }))
}
