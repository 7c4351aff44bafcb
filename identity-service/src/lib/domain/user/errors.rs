use thiserror::Error;

use crate::user::models::MAX_BIO_LENGTH;

/// Error for UserId validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("UserId is required")]
    Empty,
}

/// Error for Role validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Role is required")]
    Empty,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format")]
    InvalidFormat,
}

/// Error for directory (identity store) operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Email already in use")]
    EmailConflict,

    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Stored record is invalid: {0}")]
    CorruptRecord(String),
}

/// Top-level error for all user-related operations.
///
/// Display strings are safe to show to callers; internal detail is logged
/// where the error is produced and never carried here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password must be at least 8 characters with uppercase, lowercase, number and special character")]
    WeakPassword,

    #[error("Email already in use")]
    EmailConflict,

    #[error("User not found")]
    NotFound,

    #[error("Authentication service temporarily unavailable")]
    SecretUnavailable,

    #[error("Invalid or expired token")]
    TokenInvalid,

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,
}

impl UserError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            UserError::InvalidInput(_) => "INVALID_INPUT",
            UserError::InvalidCredentials => "INVALID_CREDENTIALS",
            UserError::WeakPassword => "WEAK_PASSWORD",
            UserError::EmailConflict => "EMAIL_CONFLICT",
            UserError::NotFound => "NOT_FOUND",
            UserError::SecretUnavailable => "SECRET_UNAVAILABLE",
            UserError::TokenInvalid => "TOKEN_INVALID",
            UserError::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    pub(crate) fn bio_too_long() -> Self {
        UserError::InvalidInput(format!(
            "Bio must be {} characters or less",
            MAX_BIO_LENGTH
        ))
    }
}

impl From<UserIdError> for UserError {
    fn from(err: UserIdError) -> Self {
        UserError::InvalidInput(err.to_string())
    }
}

impl From<RoleError> for UserError {
    fn from(err: RoleError) -> Self {
        UserError::InvalidInput(err.to_string())
    }
}

impl From<EmailError> for UserError {
    fn from(err: EmailError) -> Self {
        UserError::InvalidInput(err.to_string())
    }
}
