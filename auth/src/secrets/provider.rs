use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::cache::SecretCache;
use super::cache::SecretSource;
use super::errors::SecretError;
use super::store::SecretStore;

/// Default name of the token signing secret.
pub const JWT_SECRET_NAME: &str = "jwt-secret";

/// Default name of the directory storage connection string.
pub const STORAGE_CONNECTION_STRING_NAME: &str = "storage-connection-string";

/// Time-to-live for values fetched from the vault.
pub const DEFAULT_VAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Time-to-live for values taken from the environment fallback.
pub const DEFAULT_FALLBACK_TTL: Duration = Duration::from_secs(5 * 60);

type EnvironmentLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves named secrets from a vault with environment fallback and caching.
///
/// Lookup order for a name:
/// 1. Fresh cache entry
/// 2. Vault (`SecretStore`), cached for the vault TTL
/// 3. Environment variable derived from the name, cached for the shorter
///    fallback TTL so the vault is retried sooner
///
/// Concurrent cache misses for the same name are collapsed into a single
/// fetch. Fetches for different names do not wait on each other.
pub struct SecretProvider {
    store: Arc<dyn SecretStore>,
    cache: SecretCache,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    environment: EnvironmentLookup,
    vault_ttl: Duration,
    fallback_ttl: Duration,
    signing_secret_name: String,
    storage_secret_name: String,
}

impl SecretProvider {
    /// Create a provider over a secret store with default names and TTLs.
    ///
    /// # Arguments
    /// * `store` - Vault backend
    ///
    /// # Returns
    /// SecretProvider with an empty cache, reading fallbacks from the process environment
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            cache: SecretCache::new(),
            refresh_locks: Mutex::new(HashMap::new()),
            environment: Arc::new(|variable| std::env::var(variable).ok()),
            vault_ttl: DEFAULT_VAULT_TTL,
            fallback_ttl: DEFAULT_FALLBACK_TTL,
            signing_secret_name: JWT_SECRET_NAME.to_string(),
            storage_secret_name: STORAGE_CONNECTION_STRING_NAME.to_string(),
        }
    }

    /// Set cache lifetimes for vault-sourced and fallback-sourced values.
    pub fn with_ttls(mut self, vault_ttl: Duration, fallback_ttl: Duration) -> Self {
        self.vault_ttl = vault_ttl;
        self.fallback_ttl = fallback_ttl;
        self
    }

    /// Replace the environment variable lookup used for fallback values.
    pub fn with_environment<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.environment = Arc::new(lookup);
        self
    }

    /// Set the name of the token signing secret.
    pub fn with_signing_secret_name(mut self, name: impl ToString) -> Self {
        self.signing_secret_name = name.to_string();
        self
    }

    /// Set the name of the storage connection string secret.
    pub fn with_storage_secret_name(mut self, name: impl ToString) -> Self {
        self.storage_secret_name = name.to_string();
        self
    }

    /// Resolve the token signing secret.
    ///
    /// # Errors
    /// * `Unavailable` - Vault and fallback both failed or produced an empty value
    pub async fn signing_secret(&self) -> Result<String, SecretError> {
        self.get_secret(&self.signing_secret_name).await
    }

    /// Resolve the directory storage connection string.
    ///
    /// # Errors
    /// * `Unavailable` - Vault and fallback both failed or produced an empty value
    pub async fn storage_connection_string(&self) -> Result<String, SecretError> {
        self.get_secret(&self.storage_secret_name).await
    }

    /// Resolve a secret by name.
    ///
    /// # Arguments
    /// * `name` - Secret name
    ///
    /// # Returns
    /// Non-empty secret value
    ///
    /// # Errors
    /// * `Unavailable` - Vault and fallback both failed or produced an empty value
    pub async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        if let Some(cached) = self.cache.get_fresh(name).await {
            tracing::debug!(secret = name, source = ?cached.source, "Secret served from cache");
            return Ok(cached.value);
        }

        let refresh_lock = self.refresh_lock(name).await;
        let _refresh = refresh_lock.lock().await;

        // Another caller may have refreshed the entry while we waited
        if let Some(cached) = self.cache.get_fresh(name).await {
            tracing::debug!(secret = name, source = ?cached.source, "Secret served from cache");
            return Ok(cached.value);
        }

        let (value, source) = self.fetch(name).await?;
        let ttl = match source {
            SecretSource::Vault => self.vault_ttl,
            SecretSource::Environment => self.fallback_ttl,
        };
        self.cache.insert(name, value.clone(), source, ttl).await;

        Ok(value)
    }

    /// Drop a cached secret so the next lookup fetches it again.
    pub async fn invalidate(&self, name: &str) {
        if self.cache.invalidate(name).await.is_some() {
            tracing::info!(secret = name, "Cached secret invalidated");
        }
    }

    async fn refresh_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    async fn fetch(&self, name: &str) -> Result<(String, SecretSource), SecretError> {
        match self.store.get_secret(name).await {
            Ok(value) if !value.is_empty() => {
                tracing::info!(secret = name, source = "vault", "Secret fetched");
                return Ok((value, SecretSource::Vault));
            }
            Ok(_) => {
                tracing::warn!(secret = name, "Vault returned an empty secret");
            }
            Err(e) => {
                tracing::warn!(secret = name, error = %e, "Vault secret fetch failed");
            }
        }

        let variable = fallback_variable(name);
        match (self.environment)(&variable) {
            Some(value) if !value.is_empty() => {
                tracing::warn!(
                    secret = name,
                    variable = %variable,
                    source = "environment",
                    "Using environment fallback for secret"
                );
                Ok((value, SecretSource::Environment))
            }
            _ => {
                tracing::error!(
                    secret = name,
                    variable = %variable,
                    "Secret unavailable from vault and environment"
                );
                Err(SecretError::Unavailable(name.to_string()))
            }
        }
    }
}

/// Environment variable consulted when the vault cannot serve a secret.
///
/// `jwt-secret` becomes `JWT_SECRET`.
pub fn fallback_variable(name: &str) -> String {
    name.replace('-', "_").to_uppercase()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::secrets::errors::SecretStoreError;

    mock! {
        pub TestSecretStore {}

        #[async_trait]
        impl SecretStore for TestSecretStore {
            async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError>;
        }
    }

    fn environment(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |variable| vars.get(variable).cloned()
    }

    /// Never answers for the storage connection string.
    struct StalledStorageStore;

    #[async_trait]
    impl SecretStore for StalledStorageStore {
        async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError> {
            if name == STORAGE_CONNECTION_STRING_NAME {
                std::future::pending::<()>().await;
            }
            Ok("vault-value".to_string())
        }
    }

    fn unreachable_vault() -> MockTestSecretStore {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .returning(|_| Err(SecretStoreError::RequestFailed("connection refused".to_string())));
        store
    }

    #[test]
    fn test_fallback_variable() {
        assert_eq!(fallback_variable("jwt-secret"), "JWT_SECRET");
        assert_eq!(
            fallback_variable("storage-connection-string"),
            "STORAGE_CONNECTION_STRING"
        );
    }

    #[tokio::test]
    async fn test_vault_value_is_cached() {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .with(eq("jwt-secret"))
            .times(1)
            .returning(|_| Ok("vault-value".to_string()));

        let provider = SecretProvider::new(Arc::new(store));

        assert_eq!(provider.signing_secret().await.unwrap(), "vault-value");
        assert_eq!(provider.signing_secret().await.unwrap(), "vault-value");
    }

    #[tokio::test]
    async fn test_falls_back_to_environment() {
        let provider = SecretProvider::new(Arc::new(unreachable_vault()))
            .with_environment(environment(&[("JWT_SECRET", "env-value")]));

        assert_eq!(provider.signing_secret().await.unwrap(), "env-value");
    }

    #[tokio::test]
    async fn test_empty_vault_value_falls_back_to_environment() {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .returning(|_| Ok(String::new()));

        let provider = SecretProvider::new(Arc::new(store))
            .with_environment(environment(&[("JWT_SECRET", "env-value")]));

        assert_eq!(provider.signing_secret().await.unwrap(), "env-value");
    }

    #[tokio::test]
    async fn test_unavailable_when_vault_and_environment_fail() {
        let provider = SecretProvider::new(Arc::new(unreachable_vault()))
            .with_environment(environment(&[("JWT_SECRET", "")]));

        assert_eq!(
            provider.signing_secret().await,
            Err(SecretError::Unavailable("jwt-secret".to_string()))
        );
    }

    #[tokio::test]
    async fn test_total_failure_is_not_cached() {
        let mut store = MockTestSecretStore::new();
        let mut calls = 0;
        store.expect_get_secret().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(SecretStoreError::RequestFailed("timeout".to_string()))
            } else {
                Ok("vault-value".to_string())
            }
        });

        let provider =
            SecretProvider::new(Arc::new(store)).with_environment(environment(&[]));

        assert!(provider.signing_secret().await.is_err());
        assert_eq!(provider.signing_secret().await.unwrap(), "vault-value");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_value_expires_before_vault_value() {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .with(eq("jwt-secret"))
            .times(2)
            .returning(|_| Err(SecretStoreError::NotFound("jwt-secret".to_string())));
        store
            .expect_get_secret()
            .with(eq("storage-connection-string"))
            .times(1)
            .returning(|_| Ok("postgres://vault".to_string()));

        let provider = SecretProvider::new(Arc::new(store))
            .with_environment(environment(&[("JWT_SECRET", "env-value")]));

        provider.signing_secret().await.unwrap();
        provider.storage_connection_string().await.unwrap();

        // Fallback TTL is five minutes, vault TTL one hour
        tokio::time::advance(DEFAULT_FALLBACK_TTL + Duration::from_secs(1)).await;

        provider.signing_secret().await.unwrap();
        provider.storage_connection_string().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_vault_value_refetched_after_ttl() {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .times(2)
            .returning(|_| Ok("vault-value".to_string()));

        let provider = SecretProvider::new(Arc::new(store));

        provider.signing_secret().await.unwrap();
        tokio::time::advance(DEFAULT_VAULT_TTL - Duration::from_secs(1)).await;
        provider.signing_secret().await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        provider.signing_secret().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .times(1)
            .returning(|_| Ok("vault-value".to_string()));

        let provider = Arc::new(SecretProvider::new(Arc::new(store)));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { provider.signing_secret().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "vault-value");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_fetch_does_not_block_other_names() {
        let provider = Arc::new(SecretProvider::new(Arc::new(StalledStorageStore)));

        let stalled = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.storage_connection_string().await })
        };
        tokio::task::yield_now().await;

        let signing = tokio::time::timeout(Duration::from_secs(1), provider.signing_secret()).await;
        assert_eq!(signing.unwrap().unwrap(), "vault-value");
        assert!(!stalled.is_finished());
        stalled.abort();
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .times(2)
            .returning(|_| Ok("vault-value".to_string()));

        let provider = SecretProvider::new(Arc::new(store));

        provider.signing_secret().await.unwrap();
        provider.invalidate(JWT_SECRET_NAME).await;
        provider.signing_secret().await.unwrap();
    }

    #[tokio::test]
    async fn test_custom_secret_names() {
        let mut store = MockTestSecretStore::new();
        store
            .expect_get_secret()
            .with(eq("signing-key"))
            .times(1)
            .returning(|_| Ok("vault-value".to_string()));

        let provider = SecretProvider::new(Arc::new(store)).with_signing_secret_name("signing-key");

        assert_eq!(provider.signing_secret().await.unwrap(), "vault-value");
    }
}
