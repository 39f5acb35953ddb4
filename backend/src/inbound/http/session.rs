//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting the verified caller after login and
//! resolving the [`SessionContext`] passed into every core call.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Role, SessionContext, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct HttpSession(Session);

impl HttpSession {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated caller in the session cookie.
    ///
    /// The session id is renewed so a cookie issued before login cannot be
    /// replayed as the authenticated one.
    pub fn persist(&self, ctx: &SessionContext) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, ctx.user_id.to_string())
            .and_then(|()| self.0.insert(ROLE_KEY, ctx.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop every value held by the session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Fetch the caller's context from the session, if present.
    ///
    /// Cookies carrying an unparseable id or role are treated as anonymous.
    pub fn context(&self) -> Result<Option<SessionContext>, Error> {
        let read = |key: &str| {
            self.0
                .get::<String>(key)
                .map_err(|error| Error::internal(format!("failed to read session: {error}")))
        };
        let (Some(raw_id), Some(raw_role)) = (read(USER_ID_KEY)?, read(ROLE_KEY)?) else {
            return Ok(None);
        };
        let user_id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        match raw_role.parse::<Role>() {
            Ok(role) => Ok(Some(SessionContext::new(user_id, role))),
            Err(error) => {
                tracing::warn!(%error, "invalid role in session cookie");
                Ok(None)
            }
        }
    }

    /// Require an authenticated caller or return `401 Unauthorized`.
    pub fn require_context(&self) -> Result<SessionContext, Error> {
        self.context()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for HttpSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(HttpSession::new) })
    }
}
