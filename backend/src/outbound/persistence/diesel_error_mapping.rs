//! Shared Diesel error mapping for the engine repositories.
//!
//! Every repository port error has `Connection` and `Query` variants; these
//! helpers pick between them so each adapter only wires its constructors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through the port's connection constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Map a Diesel failure to the port's query or connection constructor.
///
/// A closed connection and a serialisation failure that outlived the
/// transaction are reported as connection errors so callers see a
/// retryable `service_unavailable`; everything else is a query error.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::SerializationFailure,
            info,
        ) => connection(info.message().to_owned()),
        DieselError::BrokenTransactionManager => {
            connection("transaction manager broken".to_owned())
        }
        DieselError::NotFound => query("record not found".to_owned()),
        DieselError::DatabaseError(_, info) => query(info.message().to_owned()),
        other => query(other.to_string()),
    }
}
