use std::collections::HashMap;

use async_trait::async_trait;

use super::errors::SecretStoreError;

/// Backend that holds named secrets (a vault).
#[async_trait]
pub trait SecretStore: Send + Sync + 'static {
    /// Fetch a secret value by name.
    ///
    /// # Arguments
    /// * `name` - Secret name (e.g. `jwt-secret`)
    ///
    /// # Returns
    /// Raw secret value
    ///
    /// # Errors
    /// * `NotFound` - The store has no secret with this name
    /// * `RequestFailed` - The store could not be reached
    /// * `InvalidResponse` - The store answered with something unreadable
    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError>;
}

/// In-process secret store backed by a fixed map.
///
/// Useful for local runs and tests; an empty store makes every lookup
/// fall through to the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret.
    pub fn with_secret(mut self, name: impl ToString, value: impl ToString) -> Self {
        self.secrets.insert(name.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound(name.to_string()))
    }
}
