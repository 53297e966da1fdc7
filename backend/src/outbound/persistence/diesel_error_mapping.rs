//! Shared Diesel error mapping for the repositories.
//!
//! Every repository port error has `Connection` and `Query` variants; these
//! helpers map pool and Diesel failures onto them through the port's
//! constructors, logging the underlying cause at `debug`.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.message().to_owned())
}

/// Map Diesel errors into query/connection constructors.
pub(super) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Constraint name of a unique violation, if `error` is one.
pub(super) fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// Whether `error` is a foreign key violation.
pub(super) fn is_foreign_key_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

/// Narrow a database integer into the domain's unsigned range.
pub(super) fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_basic_pool_error(PoolError::checkout("refused"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("refused".to_owned()));
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        let mapped = map_basic_diesel_error(DieselError::NotFound, Mapped::Query, |m: &str| {
            Mapped::Connection(m.to_owned())
        });
        assert_eq!(mapped, Mapped::Query("record not found"));
    }

    #[rstest]
    fn non_database_errors_are_not_unique_violations() {
        assert!(unique_violation(&DieselError::NotFound).is_none());
        assert!(!is_foreign_key_violation(&DieselError::RollbackTransaction));
    }

    #[rstest]
    #[case(-1, 0)]
    #[case(0, 0)]
    #[case(42, 42)]
    fn negative_database_integers_clamp_to_zero(#[case] raw: i32, #[case] expected: u32) {
        assert_eq!(non_negative(raw), expected);
    }
}
