//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: the signed-in user id, the one-shot intended
//! destination recorded before a sign-in redirect, and the one-shot flash
//! notice shown after a redirect.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const RETURN_TO_KEY: &str = "return_to";
pub(crate) const FLASH_KEY: &str = "flash";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Destroy the session, dropping the identity and any one-shot state.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Remember the path an anonymous visitor tried to reach.
    pub fn remember_return_to(&self, path: &str) -> Result<(), Error> {
        self.0
            .insert(RETURN_TO_KEY, path)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Consume the remembered destination; a second call returns `None`.
    pub fn take_return_to(&self) -> Result<Option<String>, Error> {
        let path = self
            .0
            .get::<String>(RETURN_TO_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        if path.is_some() {
            self.0.remove(RETURN_TO_KEY);
        }
        Ok(path)
    }

    /// Store a one-shot notice for the next rendered page.
    pub fn set_flash(&self, message: &str) -> Result<(), Error> {
        self.0
            .insert(FLASH_KEY, message)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Consume the stored notice; a second call returns `None`.
    pub fn take_flash(&self) -> Result<Option<String>, Error> {
        let message = self
            .0
            .get::<String>(FLASH_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        if message.is_some() {
            self.0.remove(FLASH_KEY);
        }
        Ok(message)
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
