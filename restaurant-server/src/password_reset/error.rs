use crate::error::BoxError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("No account for this email")]
    UserNotFound,

    #[error("Invalid verification code")]
    CodeInvalid,

    #[error("Verification code has expired")]
    CodeExpired,

    #[error("Too many attempts, request a new code")]
    TooManyAttempts,

    #[error("{0}")]
    InvalidPassword(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Failed to deliver reset code: {0}")]
    Delivery(BoxError),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<ResetError> for AppError {
    fn from(err: ResetError) -> Self {
        let code = match &err {
            ResetError::UserNotFound => ErrorCode::UserNotFound,
            ResetError::CodeInvalid => ErrorCode::VerificationCodeInvalid,
            ResetError::CodeExpired => ErrorCode::VerificationCodeExpired,
            ResetError::TooManyAttempts => ErrorCode::TooManyAttempts,
            ResetError::InvalidPassword(_) => ErrorCode::ValidationFailed,
            ResetError::Hash(_) | ResetError::Delivery(_) => ErrorCode::InternalError,
            ResetError::Storage(_) => ErrorCode::DatabaseError,
        };
        AppError::with_message(code, err.to_string())
    }
}
