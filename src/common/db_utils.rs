// src/common/db_utils.rs

use crate::common::error::AppError;

/// Turns a unique-index violation into a `Conflict` carrying `message`.
/// Any other database error is passed through unchanged.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::DatabaseError(err)
}
