use std::sync::Arc;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::TokenError;
use crate::token::TokenService;

/// Authentication coordinator combining password verification and token issuance.
///
/// Hashing runs on the blocking pool since adaptive hashes are deliberately slow.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: Arc<TokenService>,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Signed identity token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `token_service` - Token issuer
    /// * `password_hasher` - Hasher used for new passwords and verification
    pub fn new(token_service: Arc<TokenService>, password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            token_service,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing failed
    /// * `TaskAborted` - The blocking task was lost
    pub async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.password_hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::TaskAborted(e.to_string()))?
    }

    /// Verify credentials and issue a token for the identity.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` / `email` / `role` - Identity to embed in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unreadable or the blocking task was lost
    /// * `TokenError` - Token issuance failed
    pub async fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let hasher = self.password_hasher;
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();

        let is_valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| PasswordError::TaskAborted(e.to_string()))??;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_service.issue(user_id, email, role).await?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a token without password verification.
    ///
    /// Used after registration, when the caller has just set the credentials.
    ///
    /// # Errors
    /// * `TokenError` - Token issuance failed
    pub async fn generate_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, TokenError> {
        self.token_service.issue(user_id, email, role).await
    }
}
