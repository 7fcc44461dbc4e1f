//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` error whose details name the
//! offending field, so clients can highlight it without parsing messages.

use std::str::FromStr;

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, allowed: &[&str]) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be one of: {}", allowed.join(", ")))
        .with_details(json!({
            "field": field,
            "value": value,
            "allowed": allowed,
            "code": ErrorCode::InvalidValue.as_str(),
        }))
}

/// Parse a UUID-backed identifier from a path segment or body field.
pub(crate) fn parse_id<T: From<Uuid>>(value: &str, field: FieldName) -> Result<T, Error> {
    Uuid::parse_str(value)
        .map(T::from)
        .map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a snake_case enum value, listing the accepted spellings on failure.
pub(crate) fn parse_choice<T: FromStr>(
    value: &str,
    field: FieldName,
    allowed: &[&str],
) -> Result<T, Error> {
    value
        .parse::<T>()
        .map_err(|_| invalid_value_error(field, value, allowed))
}
