use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use thiserror::Error;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenClaims;
use crate::secrets::SecretError;
use crate::secrets::SecretProvider;

/// Lifetime of an issued token.
pub const TOKEN_LIFETIME_HOURS: i64 = 8;

/// Reason a presented token was not accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenInvalid {
    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error("Signing secret unavailable")]
    SecretUnavailable,
}

/// Error type for token issuance and refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Signing secret unavailable: {0}")]
    SecretUnavailable(#[from] SecretError),

    #[error("Token encoding failed: {0}")]
    Encoding(JwtError),

    #[error("Token rejected: {0}")]
    Rejected(#[from] TokenInvalid),
}

/// Issues and validates identity tokens signed with the vault secret.
///
/// Holds no session state: a token is valid when its signature, claims and
/// expiry check out against the current signing secret.
pub struct TokenService {
    secrets: Arc<SecretProvider>,
}

impl TokenService {
    /// Create a token service over a secret provider.
    pub fn new(secrets: Arc<SecretProvider>) -> Self {
        Self { secrets }
    }

    /// Issue a token for an identity.
    ///
    /// # Arguments
    /// * `user_id` - Subject user identifier
    /// * `email` - Email address (may be empty)
    /// * `role` - Identity role
    ///
    /// # Returns
    /// Compact JWT valid for eight hours
    ///
    /// # Errors
    /// * `SecretUnavailable` - Signing secret could not be resolved
    /// * `Encoding` - Token encoding failed
    pub async fn issue(&self, user_id: &str, email: &str, role: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, role, Utc::now()).await
    }

    pub(crate) async fn issue_at(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let secret = self.secrets.signing_secret().await?;
        let claims = Claims::for_identity(
            user_id,
            email,
            role,
            issued_at,
            Duration::hours(TOKEN_LIFETIME_HOURS),
        );

        JwtHandler::new(secret.as_bytes())
            .encode(&claims)
            .map_err(TokenError::Encoding)
    }

    /// Validate a token and recover its identity claims.
    ///
    /// Every failure is returned as a value; nothing here is fatal to the caller.
    ///
    /// # Errors
    /// * `Jwt` - Malformed, expired, badly signed, foreign, or missing `userId`/`role`
    /// * `SecretUnavailable` - No secret to verify against
    pub async fn validate(&self, token: &str) -> Result<TokenClaims, TokenInvalid> {
        let secret = self
            .secrets
            .signing_secret()
            .await
            .map_err(|_| TokenInvalid::SecretUnavailable)?;

        let claims = JwtHandler::new(secret.as_bytes()).decode(token)?;

        Ok(claims.into_token_claims()?)
    }

    /// Check whether a token passes validation.
    pub async fn is_valid(&self, token: &str) -> bool {
        self.validate(token).await.is_ok()
    }

    /// Exchange a valid token for a fresh one carrying the same identity.
    ///
    /// # Errors
    /// * `Rejected` - Presented token is invalid or has no email claim
    /// * `SecretUnavailable` - Signing secret could not be resolved
    /// * `Encoding` - Token encoding failed
    pub async fn refresh(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.validate(token).await?;

        if claims.email.is_empty() {
            return Err(TokenInvalid::Jwt(JwtError::MissingClaim("email".to_string())).into());
        }

        self.issue(&claims.user_id, &claims.email, &claims.role).await
    }
}
