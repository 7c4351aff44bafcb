use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::CredentialValidator;
use auth::PasswordHasher;
use auth::TokenClaims;
use auth::TokenError;
use auth::TokenInvalid;
use auth::TokenService;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedProfile;
use crate::domain::user::models::CreateOrUpdateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserKey;
use crate::domain::user::models::UserPatch;
use crate::domain::user::models::UserProfile;
use crate::domain::user::models::MAX_BIO_LENGTH;
use crate::user::errors::DirectoryError;
use crate::user::errors::UserError;
use crate::user::ports::UserDirectory;
use crate::user::ports::UserServicePort;

/// Domain service implementation for identity operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
    authenticator: Authenticator,
    token_service: Arc<TokenService>,
}

impl<UD> UserService<UD>
where
    UD: UserDirectory,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `directory` - Identity store implementation
    /// * `token_service` - Token issuer and validator
    /// * `password_hasher` - Hasher for new passwords and login verification
    pub fn new(
        directory: Arc<UD>,
        token_service: Arc<TokenService>,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            directory,
            authenticator: Authenticator::new(token_service.clone(), password_hasher),
            token_service,
        }
    }
}

#[async_trait]
impl<UD> UserServicePort for UserService<UD>
where
    UD: UserDirectory,
{
    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedProfile, UserError> {
        let email = EmailAddress::new(&command.email)?;

        let user = self
            .directory
            .get_by_email(&email)
            .await
            .map_err(directory_failure)?
            .ok_or_else(|| {
                tracing::warn!("Login rejected: unknown email");
                UserError::InvalidCredentials
            })?;

        let stored_hash = user
            .password_hash
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .ok_or_else(|| {
                tracing::warn!(user = %user.key(), "Login rejected: no password set");
                UserError::InvalidCredentials
            })?;

        let result = self
            .authenticator
            .authenticate(
                &command.password,
                stored_hash,
                user.user_id.as_str(),
                &user.email,
                user.role.as_str(),
            )
            .await
            .map_err(|e| {
                if matches!(e, AuthenticationError::InvalidCredentials) {
                    tracing::warn!(user = %user.key(), "Login rejected: wrong password");
                }
                authentication_failure(e)
            })?;

        tracing::info!(user = %user.key(), "User logged in");

        Ok(AuthenticatedProfile {
            profile: UserProfile::from(&user),
            token: result.access_token,
        })
    }

    async fn create_or_update_user(
        &self,
        command: CreateOrUpdateUserCommand,
    ) -> Result<AuthenticatedProfile, UserError> {
        let user_id = UserId::new(command.user_id)?;
        let role = Role::new(command.role)?;

        let email = provided(command.email)
            .map(|email| EmailAddress::new(&email))
            .transpose()?;

        let password = provided(command.password);
        if let Some(password) = &password {
            if !CredentialValidator::is_valid_password(password) {
                return Err(UserError::WeakPassword);
            }
        }

        if let Some(bio) = provided(command.bio.clone()) {
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(UserError::bio_too_long());
            }
        }

        let key = UserKey::new(role, user_id);

        if let Some(email) = &email {
            let taken = self
                .directory
                .exists_by_email(email, Some(key.clone()))
                .await
                .map_err(directory_failure)?;
            if taken {
                tracing::warn!(user = %key, "Email already held by another identity");
                return Err(UserError::EmailConflict);
            }
        }

        let existing = self.directory.get(&key).await.map_err(directory_failure)?;

        let now = Utc::now();
        let mut patch = UserPatch::new(key.clone(), now);
        patch.created_at = existing.as_ref().map_or(now, |user| user.created_at);
        patch.name = sanitize(command.name, None);
        patch.email = email;
        patch.phone = sanitize(command.phone, None);
        patch.location = sanitize(command.location, None);
        patch.lat = command.lat;
        patch.lng = command.lng;
        patch.bio = sanitize(command.bio, Some(MAX_BIO_LENGTH));
        patch.status = sanitize(command.status, None);
        patch.contact_enabled = command.contact_enabled;
        patch.profile_image_url = sanitize(command.profile_image_url, None);
        patch.email_verified = command.email_verified;

        if let Some(password) = &password {
            let hash = self.authenticator.hash_password(password).await.map_err(|e| {
                tracing::error!(user = %key, error = %e, "Password hashing failed");
                UserError::ServiceUnavailable
            })?;
            patch.password_hash = Some(hash);
        }

        let user = self.directory.upsert(patch).await.map_err(directory_failure)?;

        let token = self
            .authenticator
            .generate_token(user.user_id.as_str(), &user.email, user.role.as_str())
            .await
            .map_err(token_failure)?;

        if existing.is_some() {
            tracing::info!(user = %key, "User updated");
        } else {
            tracing::info!(user = %key, "User created");
        }

        Ok(AuthenticatedProfile {
            profile: UserProfile::from(&user),
            token,
        })
    }

    async fn get_user(&self, key: &UserKey) -> Result<UserProfile, UserError> {
        self.directory
            .get(key)
            .await
            .map_err(directory_failure)?
            .map(|user| UserProfile::from(&user))
            .ok_or(UserError::NotFound)
    }

    async fn refresh_token(&self, token: &str) -> Result<String, UserError> {
        self.token_service.refresh(token).await.map_err(token_failure)
    }

    async fn verify_token(&self, token: &str) -> Result<TokenClaims, UserError> {
        self.token_service
            .validate(token)
            .await
            .map_err(|e| token_failure(TokenError::Rejected(e)))
    }
}

/// Present and non-empty after trimming.
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Trim and optionally truncate a text field. An empty value is kept so it
/// clears the stored one; only an absent field leaves it untouched.
fn sanitize(value: Option<String>, max_chars: Option<usize>) -> Option<String> {
    value.map(|value| {
        let trimmed = value.trim();
        match max_chars {
            Some(max) => trimmed.chars().take(max).collect(),
            None => trimmed.to_string(),
        }
    })
}

fn directory_failure(err: DirectoryError) -> UserError {
    match err {
        DirectoryError::EmailConflict => UserError::EmailConflict,
        other => {
            tracing::error!(error = %other, "Directory operation failed");
            UserError::ServiceUnavailable
        }
    }
}

fn token_failure(err: TokenError) -> UserError {
    match err {
        TokenError::SecretUnavailable(e) => {
            tracing::error!(error = %e, "Signing secret unavailable");
            UserError::SecretUnavailable
        }
        TokenError::Encoding(e) => {
            tracing::error!(error = %e, "Token encoding failed");
            UserError::ServiceUnavailable
        }
        TokenError::Rejected(TokenInvalid::SecretUnavailable) => {
            tracing::error!("Signing secret unavailable for token validation");
            UserError::SecretUnavailable
        }
        TokenError::Rejected(TokenInvalid::Jwt(e)) => {
            tracing::warn!(reason = %e, "Token rejected");
            UserError::TokenInvalid
        }
    }
}

fn authentication_failure(err: AuthenticationError) -> UserError {
    match err {
        AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
        AuthenticationError::PasswordError(e) => {
            tracing::error!(error = %e, "Password verification failed");
            UserError::ServiceUnavailable
        }
        AuthenticationError::TokenError(e) => token_failure(e),
    }
}

#[cfg(test)]
mod tests {
    use auth::SecretProvider;
    use auth::StaticSecretStore;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::User;
    use crate::outbound::repositories::memory::InMemoryUserDirectory;

    const SECRET: &str = "test_secret_key_at_least_32_bytes!";
    const PASSWORD: &str = "Passw0rd!";

    mock! {
        pub TestUserDirectory {}

        #[async_trait]
        impl UserDirectory for TestUserDirectory {
            async fn get(&self, key: &UserKey) -> Result<Option<User>, DirectoryError>;
            async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<User>, DirectoryError>;
            async fn upsert(&self, patch: UserPatch) -> Result<User, DirectoryError>;
            async fn exists_by_email(&self, email: &EmailAddress, excluding: Option<UserKey>) -> Result<bool, DirectoryError>;
            async fn delete(&self, key: &UserKey) -> Result<(), DirectoryError>;
        }
    }

    fn token_service(store: StaticSecretStore) -> Arc<TokenService> {
        let provider = SecretProvider::new(Arc::new(store)).with_environment(|_| None);
        Arc::new(TokenService::new(Arc::new(provider)))
    }

    fn service_with<UD: UserDirectory>(directory: UD) -> UserService<UD> {
        let store = StaticSecretStore::new().with_secret("jwt-secret", SECRET);
        UserService::new(
            Arc::new(directory),
            token_service(store),
            PasswordHasher::with_cost(4),
        )
    }

    fn service() -> UserService<InMemoryUserDirectory> {
        service_with(InMemoryUserDirectory::new())
    }

    fn registration(user_id: &str, email: &str) -> CreateOrUpdateUserCommand {
        CreateOrUpdateUserCommand {
            user_id: user_id.to_string(),
            role: "guest".to_string(),
            name: Some("Alice".to_string()),
            email: Some(email.to_string()),
            password: Some(PASSWORD.to_string()),
            ..Default::default()
        }
    }

    fn key(user_id: &str) -> UserKey {
        UserKey::new(Role::new("guest").unwrap(), UserId::new(user_id).unwrap())
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();

        let registered = service
            .create_or_update_user(registration("u-1", "Alice@Example.com"))
            .await
            .expect("Registration failed");
        assert_eq!(registered.profile.email, "alice@example.com");
        assert_eq!(registered.profile.status, "Active");

        let claims = service.verify_token(&registered.token).await.unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.role, "guest");

        let logged_in = service
            .login(LoginCommand::new("  ALICE@example.com ", PASSWORD))
            .await
            .expect("Login failed");
        assert_eq!(logged_in.profile.user_id, "u-1");
        assert_eq!(logged_in.profile.name, "Alice");
        assert!(service.verify_token(&logged_in.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_email_alike() {
        let service = service();
        service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await
            .unwrap();

        let wrong_password = service
            .login(LoginCommand::new("alice@example.com", "Wrong_passw0rd"))
            .await;
        assert_eq!(wrong_password, Err(UserError::InvalidCredentials));

        let unknown = service
            .login(LoginCommand::new("bob@example.com", PASSWORD))
            .await;
        assert_eq!(unknown, Err(UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email() {
        let service = service();

        let result = service.login(LoginCommand::new("alice", PASSWORD)).await;
        assert!(matches!(result, Err(UserError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_login_without_stored_password_is_rejected() {
        let service = service();
        let mut command = registration("u-1", "alice@example.com");
        command.password = None;
        service.create_or_update_user(command).await.unwrap();

        let result = service
            .login(LoginCommand::new("alice@example.com", PASSWORD))
            .await;
        assert_eq!(result, Err(UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_registration_requires_key() {
        let service = service();

        let mut command = registration("", "alice@example.com");
        let result = service.create_or_update_user(command.clone()).await;
        assert!(matches!(result, Err(UserError::InvalidInput(_))));

        command.user_id = "u-1".to_string();
        command.role = " ".to_string();
        let result = service.create_or_update_user(command).await;
        assert!(matches!(result, Err(UserError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_registration_validates_fields() {
        let service = service();

        let result = service
            .create_or_update_user(registration("u-1", "not-an-email"))
            .await;
        assert_eq!(
            result,
            Err(UserError::InvalidInput("Invalid email format".to_string()))
        );

        let mut weak = registration("u-1", "alice@example.com");
        weak.password = Some("password".to_string());
        assert_eq!(
            service.create_or_update_user(weak).await,
            Err(UserError::WeakPassword)
        );

        let mut long_bio = registration("u-1", "alice@example.com");
        long_bio.bio = Some("x".repeat(MAX_BIO_LENGTH + 1));
        assert_eq!(
            service.create_or_update_user(long_bio).await,
            Err(UserError::bio_too_long())
        );
    }

    #[tokio::test]
    async fn test_bio_at_limit_is_accepted_and_trimmed() {
        let service = service();

        let mut command = registration("u-1", "alice@example.com");
        command.bio = Some(format!("  {}", "é".repeat(MAX_BIO_LENGTH - 2)));
        let result = service.create_or_update_user(command).await.unwrap();

        assert_eq!(result.profile.bio.chars().count(), MAX_BIO_LENGTH - 2);
    }

    #[tokio::test]
    async fn test_email_conflict_across_identities() {
        let service = service();
        service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await
            .unwrap();

        let result = service
            .create_or_update_user(registration("u-2", "ALICE@example.com"))
            .await;
        assert_eq!(result, Err(UserError::EmailConflict));

        let resubmitted = service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await;
        assert!(resubmitted.is_ok());
    }

    #[tokio::test]
    async fn test_update_preserves_password_and_created_at() {
        let service = service();
        let first = service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await
            .unwrap();

        let update = CreateOrUpdateUserCommand {
            user_id: "u-1".to_string(),
            role: "guest".to_string(),
            bio: Some("  Hello there  ".to_string()),
            password: Some(String::new()),
            ..Default::default()
        };
        let updated = service.create_or_update_user(update).await.unwrap();

        assert_eq!(updated.profile.name, "Alice");
        assert_eq!(updated.profile.email, "alice@example.com");
        assert_eq!(updated.profile.bio, "Hello there");
        assert_eq!(updated.profile.created_at, first.profile.created_at);
        assert!(updated.profile.updated_at >= first.profile.updated_at);

        let login = service
            .login(LoginCommand::new("alice@example.com", PASSWORD))
            .await;
        assert!(login.is_ok());
    }

    #[tokio::test]
    async fn test_update_with_empty_text_clears_stored_value() {
        let service = service();
        let mut command = registration("u-1", "alice@example.com");
        command.bio = Some("old bio".to_string());
        command.phone = Some("555".to_string());
        command.location = Some("Lagos".to_string());
        service.create_or_update_user(command).await.unwrap();

        let update = CreateOrUpdateUserCommand {
            user_id: "u-1".to_string(),
            role: "guest".to_string(),
            bio: Some(String::new()),
            phone: Some("   ".to_string()),
            email: Some(String::new()),
            ..Default::default()
        };
        let updated = service.create_or_update_user(update).await.unwrap();

        assert_eq!(updated.profile.bio, "");
        assert_eq!(updated.profile.phone, "");
        assert_eq!(updated.profile.location, "Lagos");
        assert_eq!(updated.profile.name, "Alice");
        assert_eq!(updated.profile.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_with_new_password_replaces_hash() {
        let service = service();
        service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await
            .unwrap();

        let mut update = registration("u-1", "alice@example.com");
        update.password = Some("N3w_password".to_string());
        service.create_or_update_user(update).await.unwrap();

        let old = service
            .login(LoginCommand::new("alice@example.com", PASSWORD))
            .await;
        assert_eq!(old, Err(UserError::InvalidCredentials));

        let new = service
            .login(LoginCommand::new("alice@example.com", "N3w_password"))
            .await;
        assert!(new.is_ok());
    }

    #[tokio::test]
    async fn test_get_user() {
        let service = service();
        service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await
            .unwrap();

        let profile = service.get_user(&key("u-1")).await.unwrap();
        assert_eq!(profile.name, "Alice");

        assert_eq!(
            service.get_user(&key("u-2")).await,
            Err(UserError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_directory_failure_is_service_unavailable() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_get()
            .returning(|_| Err(DirectoryError::Unavailable("connection refused".to_string())));
        directory
            .expect_get_by_email()
            .returning(|_| Err(DirectoryError::Unavailable("connection refused".to_string())));

        let service = service_with(directory);

        assert_eq!(
            service.get_user(&key("u-1")).await,
            Err(UserError::ServiceUnavailable)
        );
        assert_eq!(
            service
                .login(LoginCommand::new("alice@example.com", PASSWORD))
                .await,
            Err(UserError::ServiceUnavailable)
        );
    }

    #[tokio::test]
    async fn test_store_level_email_conflict_is_reported() {
        let mut directory = MockTestUserDirectory::new();
        directory.expect_exists_by_email().returning(|_, _| Ok(false));
        directory.expect_get().returning(|_| Ok(None));
        directory
            .expect_upsert()
            .times(1)
            .returning(|_| Err(DirectoryError::EmailConflict));

        let service = service_with(directory);

        let mut command = registration("u-1", "alice@example.com");
        command.password = None;
        assert_eq!(
            service.create_or_update_user(command).await,
            Err(UserError::EmailConflict)
        );
    }

    #[tokio::test]
    async fn test_conflict_check_excludes_own_key() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_exists_by_email()
            .withf(|email, excluding| {
                email.as_str() == "alice@example.com" && excluding.as_ref() == Some(&key("u-1"))
            })
            .times(1)
            .returning(|_, _| Ok(false));
        directory.expect_get().returning(|_| Ok(None));
        directory
            .expect_upsert()
            .returning(|patch| Ok(patch.apply_to(None)));

        let service = service_with(directory);

        let mut command = registration("u-1", "alice@example.com");
        command.password = None;
        assert!(service.create_or_update_user(command).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_secret_is_secret_unavailable() {
        let service = UserService::new(
            Arc::new(InMemoryUserDirectory::new()),
            token_service(StaticSecretStore::new()),
            PasswordHasher::with_cost(4),
        );

        let result = service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await;
        assert_eq!(result, Err(UserError::SecretUnavailable));

        assert_eq!(
            service.verify_token("a.b.c").await,
            Err(UserError::SecretUnavailable)
        );
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let service = service();
        let registered = service
            .create_or_update_user(registration("u-1", "alice@example.com"))
            .await
            .unwrap();

        let refreshed = service.refresh_token(&registered.token).await.unwrap();
        let claims = service.verify_token(&refreshed).await.unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.email, "alice@example.com");

        let mut tampered = registered.token.clone();
        tampered.push('x');
        assert_eq!(
            service.refresh_token(&tampered).await,
            Err(UserError::TokenInvalid)
        );
    }
}
