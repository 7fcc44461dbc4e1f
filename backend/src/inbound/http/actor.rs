//! Caller identity extraction.
//!
//! Authentication happens upstream: the gateway verifies the session and
//! forwards the caller as `X-User-Id` / `X-User-Role` headers. Handlers take
//! an [`ActorContext`] argument and receive the parsed [`Actor`], or the
//! request fails with `401` before the handler runs.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use tracing::debug;

use crate::domain::{Actor, Error, Role, UserId};

/// Header carrying the authenticated user's UUID.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor wrapping the authenticated [`Actor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext(pub Actor);

impl ActorContext {
    pub const fn actor(&self) -> Actor {
        self.0
    }

    pub const fn user_id(&self) -> UserId {
        self.0.user_id
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, Error> {
    let value = req
        .headers()
        .get(name)
        .ok_or_else(|| Error::unauthenticated(format!("missing {name} header")))?;
    value
        .to_str()
        .map_err(|_| Error::unauthenticated(format!("{name} header is not valid text")))
}

fn extract_actor(req: &HttpRequest) -> Result<Actor, Error> {
    let raw_id = header(req, USER_ID_HEADER)?;
    let user_id = UserId::new(raw_id).map_err(|err| {
        debug!(error = %err, "rejecting malformed user id header");
        Error::unauthenticated(format!("{USER_ID_HEADER} header must be a UUID"))
    })?;
    let role = header(req, USER_ROLE_HEADER)?
        .parse::<Role>()
        .map_err(|err| Error::unauthenticated(err.to_string()))?;
    Ok(Actor::new(user_id, role))
}

impl FromRequest for ActorContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_actor(req).map(Self))
    }
}
