//! Shared helpers for the Diesel repositories.
//!
//! - Error mapping from pool and Diesel errors into port error constructors.
//! - Revision conversion between the `INTEGER` column and domain `u32`.
//! - JSON encoding of the application arrays.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error.
pub(super) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors into query or connection errors.
///
/// Unique violations are not special-cased here; callers that care inspect
/// the error with [`unique_violation_constraint`] first.
pub(super) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
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
        DieselError::BrokenTransactionManager => connection("database connection error"),
        _ => query("database error"),
    }
}

/// Name of the violated constraint when `error` is a unique violation.
pub(super) fn unique_violation_constraint(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// Convert a stored revision; negative values indicate a corrupt row.
pub(super) fn revision_from_db(revision: i32) -> Option<u32> {
    u32::try_from(revision).ok()
}

/// Convert a domain revision for storage.
pub(super) fn revision_to_db(revision: u32) -> Option<i32> {
    i32::try_from(revision).ok()
}

/// Encode an application array for a `JSONB` column.
pub(super) fn encode_json<T: Serialize>(value: &T) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|err| format!("failed to encode applications: {err}"))
}

/// Decode an application array from a `JSONB` column.
pub(super) fn decode_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|err| format!("failed to decode applications: {err}"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ApplicationRef, ApplicationStatus, PostingId};
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("refused"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("refused".into()));
    }

    #[rstest]
    #[case(DieselError::NotFound, Mapped::Query("record not found"))]
    #[case(DieselError::RollbackTransaction, Mapped::Query("database error"))]
    #[case(DieselError::BrokenTransactionManager, Mapped::Connection("database connection error".into()))]
    fn diesel_errors_are_classified(#[case] error: DieselError, #[case] expected: Mapped) {
        let mapped = map_diesel_error(error, Mapped::Query, |message| {
            Mapped::Connection(message.to_owned())
        });
        assert_eq!(mapped, expected);
    }

    #[rstest]
    #[case(0, Some(0))]
    #[case(7, Some(7))]
    #[case(-1, None)]
    fn stored_revisions_must_be_non_negative(#[case] stored: i32, #[case] expected: Option<u32>) {
        assert_eq!(revision_from_db(stored), expected);
    }

    #[rstest]
    fn oversized_revisions_cannot_be_stored() {
        assert_eq!(revision_to_db(u32::MAX), None);
        assert_eq!(revision_to_db(3), Some(3));
    }

    #[rstest]
    fn application_arrays_use_camel_case_keys() {
        let posting_id = PostingId::random();
        let encoded = encode_json(&vec![ApplicationRef {
            posting_id,
            status: ApplicationStatus::Approved,
        }])
        .expect("encode");

        assert_eq!(encoded[0]["postingId"], posting_id.to_string());
        assert_eq!(encoded[0]["status"], "approved");
        let decoded: Vec<ApplicationRef> = decode_json(encoded).expect("decode");
        assert_eq!(decoded[0].posting_id, posting_id);
    }
}
