use thiserror::Error;

/// Error type for password hashing and verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored hash is not a readable bcrypt hash
    #[error("Password verification failed: {0}")]
    VerificationFailed(String),

    /// The blocking hashing task was cancelled or panicked
    #[error("Password task aborted: {0}")]
    TaskAborted(String),
}
