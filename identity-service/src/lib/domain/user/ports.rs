use async_trait::async_trait;
use auth::TokenClaims;

use crate::domain::user::models::AuthenticatedProfile;
use crate::domain::user::models::CreateOrUpdateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserKey;
use crate::domain::user::models::UserPatch;
use crate::domain::user::models::UserProfile;
use crate::user::errors::DirectoryError;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Verify email and password and issue a token.
    ///
    /// # Arguments
    /// * `command` - Raw email and password
    ///
    /// # Returns
    /// Public profile with a fresh token
    ///
    /// # Errors
    /// * `InvalidInput` - Email is malformed
    /// * `InvalidCredentials` - Unknown email, no password set, or wrong password
    /// * `SecretUnavailable` - Token could not be signed
    /// * `ServiceUnavailable` - Directory or hashing failure
    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedProfile, UserError>;

    /// Register an identity or update it in place, then issue a token.
    ///
    /// # Arguments
    /// * `command` - Identity key plus optional profile fields and password
    ///
    /// # Returns
    /// Merged public profile with a fresh token
    ///
    /// # Errors
    /// * `InvalidInput` - Missing key, malformed email, or bio too long
    /// * `WeakPassword` - Password fails the strength policy
    /// * `EmailConflict` - Email belongs to another identity
    /// * `SecretUnavailable` - Token could not be signed
    /// * `ServiceUnavailable` - Directory or hashing failure
    async fn create_or_update_user(
        &self,
        command: CreateOrUpdateUserCommand,
    ) -> Result<AuthenticatedProfile, UserError>;

    /// Retrieve a public profile by key.
    ///
    /// # Errors
    /// * `NotFound` - No identity under this key
    /// * `ServiceUnavailable` - Directory failure
    async fn get_user(&self, key: &UserKey) -> Result<UserProfile, UserError>;

    /// Exchange a valid token for a fresh one.
    ///
    /// # Errors
    /// * `TokenInvalid` - Presented token is invalid or lacks an email claim
    /// * `SecretUnavailable` - Token could not be signed or verified
    async fn refresh_token(&self, token: &str) -> Result<String, UserError>;

    /// Validate a bearer token for an inbound request.
    ///
    /// # Errors
    /// * `TokenInvalid` - Token is invalid
    /// * `SecretUnavailable` - No secret to verify against
    async fn verify_token(&self, token: &str) -> Result<TokenClaims, UserError>;
}

/// Persistence operations for identity records.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve a record by key.
    ///
    /// # Returns
    /// Optional record (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Store operation failed
    async fn get(&self, key: &UserKey) -> Result<Option<User>, DirectoryError>;

    /// Retrieve the first record holding a normalized email.
    ///
    /// # Errors
    /// * `Unavailable` - Store operation failed
    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<User>, DirectoryError>;

    /// Insert or merge a record.
    ///
    /// # Arguments
    /// * `patch` - Fields to write; `None` fields keep stored values
    ///
    /// # Returns
    /// The record as stored after the merge
    ///
    /// # Errors
    /// * `EmailConflict` - Store-level uniqueness check rejected the email
    /// * `Unavailable` - Store operation failed
    async fn upsert(&self, patch: UserPatch) -> Result<User, DirectoryError>;

    /// Check whether an email is held by any record other than `excluding`.
    ///
    /// # Errors
    /// * `Unavailable` - Store operation failed
    async fn exists_by_email(
        &self,
        email: &EmailAddress,
        excluding: Option<UserKey>,
    ) -> Result<bool, DirectoryError>;

    /// Remove a record.
    ///
    /// # Errors
    /// * `Unavailable` - Store operation failed
    async fn delete(&self, key: &UserKey) -> Result<(), DirectoryError>;
}
