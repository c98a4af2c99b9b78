//! Shared Diesel and pool error mapping for the repositories.
//!
//! Every repository error type has `connection` and `query` constructors; the
//! [`repository_error_mappers!`] macro generates the two `map_*` functions a
//! repository module needs from them.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through a repository's connection constructor.
pub(crate) fn map_basic_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.into_message())
}

/// Map a Diesel failure to a connection or query error, logging the detail at
/// `debug` and keeping driver text out of the returned message.
pub(crate) fn map_basic_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::BrokenTransactionManager => connection("database connection error"),
        _ => query("database error"),
    }
}

/// Whether the failure is a unique constraint violation.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Generate `map_pool_error` and `map_diesel_error` for a repository error
/// type exposing `connection` and `query` constructors.
macro_rules! repository_error_mappers {
    ($error:ty) => {
        fn map_pool_error(
            error: $crate::outbound::persistence::pool::PoolError,
        ) -> $error {
            $crate::outbound::persistence::diesel_error_mapping::map_basic_pool_error(
                error,
                <$error>::connection,
            )
        }

        fn map_diesel_error(error: diesel::result::Error) -> $error {
            $crate::outbound::persistence::diesel_error_mapping::map_basic_diesel_error(
                error,
                <$error>::query,
                <$error>::connection,
            )
        }
    };
}

pub(crate) use repository_error_mappers;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::CourseRepositoryError;

    fn map(error: DieselError) -> CourseRepositoryError {
        map_basic_diesel_error(
            error,
            CourseRepositoryError::query,
            CourseRepositoryError::connection,
        )
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        assert!(matches!(
            map(DieselError::NotFound),
            CourseRepositoryError::Query { .. }
        ));
    }

    #[rstest]
    fn broken_transactions_are_connection_errors() {
        assert!(matches!(
            map(DieselError::BrokenTransactionManager),
            CourseRepositoryError::Connection { .. }
        ));
    }

    #[rstest]
    fn pool_failures_become_connection_errors() {
        let mapped = map_basic_pool_error(
            PoolError::checkout("timed out"),
            CourseRepositoryError::connection,
        );
        assert_eq!(
            mapped,
            CourseRepositoryError::connection("timed out".to_owned())
        );
    }

    #[rstest]
    fn rollbacks_are_not_unique_violations() {
        assert!(!is_unique_violation(&DieselError::RollbackTransaction));
    }
}
