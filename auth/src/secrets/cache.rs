use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// Where a cached secret value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Vault,
    Environment,
}

/// Cached secret with its freshness metadata.
#[derive(Debug, Clone)]
pub struct CachedSecret {
    pub value: String,
    pub source: SecretSource,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl CachedSecret {
    /// Check if the entry is still within its time-to-live.
    pub fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

/// Process-wide secret cache keyed by secret name.
///
/// Entries are never refreshed proactively; stale entries stay in place
/// until the next fetch overwrites them.
#[derive(Debug, Default)]
pub struct SecretCache {
    entries: RwLock<HashMap<String, CachedSecret>>,
}

impl SecretCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an entry if present and not expired.
    pub async fn get_fresh(&self, name: &str) -> Option<CachedSecret> {
        let entries = self.entries.read().await;
        entries.get(name).filter(|entry| entry.is_fresh()).cloned()
    }

    /// Store a freshly fetched value, replacing any previous entry.
    pub async fn insert(
        &self,
        name: &str,
        value: String,
        source: SecretSource,
        ttl: Duration,
    ) -> CachedSecret {
        let entry = CachedSecret {
            value,
            source,
            fetched_at: Instant::now(),
            ttl,
        };

        let mut entries = self.entries.write().await;
        entries.insert(name.to_string(), entry.clone());
        entry
    }

    /// Drop an entry so the next lookup goes back to the source.
    pub async fn invalidate(&self, name: &str) -> Option<CachedSecret> {
        self.entries.write().await.remove(name)
    }
}
