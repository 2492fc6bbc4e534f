//! Embedded schema migrations, applied once at startup.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while bringing the schema up to date.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open a connection to apply migrations over.
    #[error("failed to connect for migrations: {0}")]
    Connection(#[from] diesel::ConnectionError),

    /// A migration failed part-way through.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
}

/// Apply all pending migrations over a short-lived synchronous connection.
///
/// Runs before the async pool is built, so a blocking connection here never
/// competes with request handling.
pub fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut connection = PgConnection::establish(database_url)?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply(err.to_string()))?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(())
}
