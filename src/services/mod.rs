//! Business operations behind the dashboard routes.
//!
//! Every operation checks the caller's role first, validates its input and
//! only then talks to the repository.

use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod clients;
pub mod dashboard;
pub mod editor;
pub mod emails;
pub mod invoices;
pub mod notifications;
pub mod partners;
pub mod quotations;
pub mod reminders;
pub mod settings;
pub mod templates;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller's role is not allowed to perform the operation.
    #[error("access denied")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    Conflict(String),

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Logs a failed operation and passes the error through.
pub(crate) fn log_failure(action: &str) -> impl FnOnce(ServiceError) -> ServiceError + '_ {
    move |err| {
        log::error!("Failed to {action}: {err}");
        err
    }
}

/// Maps a constraint violation raised by `delete` to a user facing conflict.
pub(crate) fn delete_conflict(entity: &str) -> impl FnOnce(RepositoryError) -> ServiceError + '_ {
    move |err| match err {
        RepositoryError::ConstraintViolation(_) => {
            ServiceError::Conflict(format!("The {entity} is still referenced and cannot be deleted"))
        }
        other => ServiceError::from(other),
    }
}

/// Maps a file storage failure to an internal error.
pub(crate) fn storage_failure(action: &str) -> impl FnOnce(std::io::Error) -> ServiceError + '_ {
    move |err| ServiceError::Internal(format!("failed to {action}: {err}"))
}
