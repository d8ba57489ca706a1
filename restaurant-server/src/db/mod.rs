//! Database access layer
//!
//! Catalog repositories are free functions over `&PgPool`; the order and
//! reset repositories implement the service store traits.

pub mod foods;
pub mod menus;
pub mod notes;
pub mod orders;
pub mod password_resets;
pub mod restaurants;
pub mod tables;
pub mod users;

use shared::error::AppError;

use crate::error::ServiceError;

/// Map constraint violations on insert/update to client errors.
///
/// `what` names the resource for the duplicate message.
pub(crate) fn constraint_error(err: sqlx::Error, what: &str) -> ServiceError {
    let code = err
        .as_database_error()
        .and_then(|e| e.code())
        .map(|c| c.into_owned());
    match code.as_deref() {
        // unique_violation
        Some("23505") => AppError::already_exists(what).into(),
        // foreign_key_violation
        Some("23503") => AppError::validation("Referenced record does not exist").into(),
        // check_violation
        Some("23514") => AppError::validation(format!("Invalid {what} data")).into(),
        _ => err.into(),
    }
}
