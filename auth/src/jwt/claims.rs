use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::JwtError;

/// Identity claims as carried on the wire.
///
/// Every field is optional so that tokens with missing claims still decode
/// and can be rejected with a precise reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject user identifier
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Normalized email address (may be empty)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role the identity is stored under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// JWT ID (unique token identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for an identity with a fresh token ID.
    ///
    /// # Arguments
    /// * `user_id` - Subject user identifier
    /// * `email` - Email address
    /// * `role` - Identity role
    /// * `issued_at` - Issuance instant
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Claims with identity fields, jti, iat and exp set
    pub fn for_identity(
        user_id: impl ToString,
        email: impl ToString,
        role: impl ToString,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            email: Some(email.to_string()),
            role: Some(role.to_string()),
            jti: Some(Uuid::new_v4().to_string()),
            iat: Some(issued_at.timestamp()),
            exp: Some((issued_at + lifetime).timestamp()),
            iss: None,
            aud: None,
        }
    }

    /// Set user identifier.
    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Set role.
    pub fn with_role(mut self, role: impl ToString) -> Self {
        self.role = Some(role.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl ToString) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Set audience.
    pub fn with_audience(mut self, aud: impl ToString) -> Self {
        self.aud = Some(aud.to_string());
        self
    }

    /// Convert into validated identity claims.
    ///
    /// # Errors
    /// * `MissingClaim` - `userId` or `role` is absent or empty
    pub fn into_token_claims(self) -> Result<TokenClaims, JwtError> {
        let user_id = non_empty(self.user_id).ok_or(JwtError::MissingClaim("userId".into()))?;
        let role = non_empty(self.role).ok_or(JwtError::MissingClaim("role".into()))?;

        Ok(TokenClaims {
            user_id,
            role,
            email: self.email.unwrap_or_default(),
            jti: self.jti,
            issued_at: self.iat.and_then(timestamp),
            expires_at: self.exp.and_then(timestamp),
        })
    }
}

/// Identity claims recovered from a token that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub jti: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn timestamp(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}
