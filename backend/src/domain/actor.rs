//! Authenticated caller identity and role checks.
//!
//! The auth collaborator supplies a `(user id, role)` pair with every
//! operation. The engine trusts the pair and enforces role restrictions
//! itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Error, UserId};

/// Role attached to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Professor,
}

impl Role {
    /// Stable string form used in headers and storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Professor => "professor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "professor" => Ok(Self::Professor),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

/// Authenticated caller of an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub const fn student(user_id: UserId) -> Self {
        Self::new(user_id, Role::Student)
    }

    pub const fn professor(user_id: UserId) -> Self {
        Self::new(user_id, Role::Professor)
    }

    /// Require the caller to be a student.
    ///
    /// # Errors
    /// Returns [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized)
    /// for any other role.
    pub fn require_student(&self) -> Result<UserId, Error> {
        self.require(Role::Student)
    }

    /// Require the caller to be a professor.
    ///
    /// # Errors
    /// Returns [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized)
    /// for any other role.
    pub fn require_professor(&self) -> Result<UserId, Error> {
        self.require(Role::Professor)
    }

    fn require(&self, role: Role) -> Result<UserId, Error> {
        if self.role == role {
            Ok(self.user_id)
        } else {
            Err(Error::unauthorized(format!(
                "only a {role} may perform this operation"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("student", Role::Student)]
    #[case("professor", Role::Professor)]
    fn parses_known_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    fn rejects_unknown_role() {
        let err = "admin".parse::<Role>().expect_err("admin is not a role");
        assert_eq!(err.to_string(), "unknown role: admin");
    }

    #[rstest]
    fn professor_cannot_act_as_student() {
        let actor = Actor::professor(UserId::random());
        let err = actor.require_student().expect_err("role mismatch");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn matching_role_yields_user_id() {
        let user_id = UserId::random();
        let actor = Actor::student(user_id);
        assert_eq!(actor.require_student().expect("student"), user_id);
    }
}
