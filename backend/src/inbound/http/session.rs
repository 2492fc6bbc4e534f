//! Session helpers keeping HTTP handlers free of framework plumbing.
//!
//! The cookie session stores exactly two values: the authenticated owner id
//! and the granted role. Handlers never read a caller identity from the
//! request payload; it always comes from here.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::AuthenticatedUser;
use crate::domain::{Error, OwnerId, Role};

pub(crate) const OWNER_ID_KEY: &str = "owner_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper exposing portal-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist an authenticated identity in the session cookie.
    pub fn persist_identity(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0
            .insert(OWNER_ID_KEY, user.owner_id.as_ref())
            .and_then(|()| self.0.insert(ROLE_KEY, user.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the session entirely.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Fetch the current owner id from the session, if present and valid.
    pub fn owner_id(&self) -> Result<Option<OwnerId>, Error> {
        let id = self
            .0
            .get::<String>(OWNER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match OwnerId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid owner id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Fetch the role stored alongside the owner id, if any.
    pub fn role(&self) -> Result<Option<Role>, Error> {
        let raw = self
            .0
            .get::<String>(ROLE_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.as_deref().and_then(Role::parse))
    }

    /// Require an authenticated owner or return `401 Unauthorized`.
    pub fn require_owner(&self) -> Result<OwnerId, Error> {
        self.owner_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an authenticated organiser or return `401`/`403`.
    pub fn require_admin(&self) -> Result<OwnerId, Error> {
        let owner_id = self.require_owner()?;
        match self.role()? {
            Some(Role::Admin) => Ok(owner_id),
            _ => Err(Error::forbidden("organiser access required")),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
