//! Authentication utilities library
//!
//! Provides the authentication core used by the identity service:
//! - Secret resolution (vault with environment fallback and TTL cache)
//! - Identity token issuance, validation and refresh (HS256 JWT)
//! - Password hashing (bcrypt)
//! - Credential policy checks
//!
//! The service crate owns its domain errors and adapts these building blocks.
//!
//! # Examples
//!
//! ## Credential Policy
//! ```
//! use auth::CredentialValidator;
//!
//! assert!(CredentialValidator::is_valid_email("a@b.com"));
//! assert!(CredentialValidator::is_valid_password("Passw0rd!"));
//! assert!(!CredentialValidator::is_valid_password("password"));
//! ```
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(4);
//! let hash = hasher.hash("Passw0rd!").unwrap();
//! assert!(hasher.verify("Passw0rd!", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{SecretProvider, StaticSecretStore, TokenService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = StaticSecretStore::new().with_secret("jwt-secret", "secret_key_at_least_32_bytes_long!");
//! let tokens = TokenService::new(Arc::new(SecretProvider::new(Arc::new(store))));
//!
//! let token = tokens.issue("user123", "alice@example.com", "guest").await.unwrap();
//! let claims = tokens.validate(&token).await.unwrap();
//! assert_eq!(claims.role, "guest");
//! # }
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod secrets;
pub mod token;
pub mod validation;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use secrets::SecretError;
pub use secrets::SecretProvider;
pub use secrets::SecretStore;
pub use secrets::SecretStoreError;
pub use secrets::StaticSecretStore;
pub use token::TokenError;
pub use token::TokenInvalid;
pub use token::TokenService;
pub use validation::CredentialValidator;
