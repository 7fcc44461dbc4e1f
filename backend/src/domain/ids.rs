//! Strongly typed identifiers for users and catalogue entries.
//!
//! Every identifier wraps a UUID. Catalogue identifiers are plain newtypes;
//! [`UserId`] additionally validates textual input because it arrives from
//! the auth collaborator as a header or request field.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when parsing identifiers from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    #[error("identifier must not be empty")]
    Empty,
    #[error("identifier must be a valid UUID")]
    Invalid,
}

fn parse_uuid(raw: &str) -> Result<Uuid, IdValidationError> {
    if raw.is_empty() {
        return Err(IdValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdValidationError::Invalid);
    }
    Uuid::parse_str(raw).map_err(|_| IdValidationError::Invalid)
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse and validate an identifier from text.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, IdValidationError> {
                parse_uuid(raw.as_ref()).map(Self)
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id! {
    /// Stable user identifier supplied by the auth collaborator.
    UserId
}

define_id! {
    /// Identifier of a trail in the curriculum catalogue.
    TrailId
}

define_id! {
    /// Identifier of a module within a trail.
    ModuleId
}

define_id! {
    /// Identifier of an achievement catalogue entry.
    AchievementId
}

define_id! {
    /// Identifier of a reward redemption request.
    RewardRequestId
}
