pub mod cache;
pub mod errors;
pub mod provider;
pub mod store;

pub use cache::CachedSecret;
pub use cache::SecretCache;
pub use cache::SecretSource;
pub use errors::SecretError;
pub use errors::SecretStoreError;
pub use provider::SecretProvider;
pub use store::SecretStore;
pub use store::StaticSecretStore;
