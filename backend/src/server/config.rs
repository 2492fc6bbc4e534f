//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};

use crate::outbound::email::SmtpConfig;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
///
/// Infrastructure is attached piecewise; anything left unset falls back to
/// the fixture adapter for that port, so the server always starts.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) blob_root: Option<PathBuf>,
    pub(crate) smtp: Option<SmtpConfig>,
}

impl ServerConfig {
    /// Construct a server configuration with no infrastructure attached.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            blob_root: None,
            smtp: None,
        }
    }

    /// Attach a database connection pool for the registration repository.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach a filesystem root for the design-file blob store.
    #[must_use]
    pub fn with_blob_root(mut self, root: PathBuf) -> Self {
        self.blob_root = Some(root);
        self
    }

    /// Attach SMTP relay settings for the confirmation notifier.
    #[must_use]
    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = Some(smtp);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
