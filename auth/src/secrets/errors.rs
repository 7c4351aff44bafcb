use thiserror::Error;

/// Error type for secret store backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretStoreError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret store request failed: {0}")]
    RequestFailed(String),

    #[error("Secret store returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Error type for secret resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    /// Neither the vault nor the environment fallback produced a value.
    #[error("Secret unavailable: {0}")]
    Unavailable(String),
}
