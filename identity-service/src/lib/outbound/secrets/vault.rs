use std::time::Duration;

use async_trait::async_trait;
use auth::SecretStore;
use auth::SecretStoreError;
use reqwest::StatusCode;
use serde::Deserialize;

/// Default REST API version of the vault.
pub const DEFAULT_API_VERSION: &str = "7.4";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Secret store speaking the Key Vault REST shape.
///
/// `GET {vault_url}/secrets/{name}?api-version={version}` with an optional
/// bearer access token; the secret is the `value` field of the JSON body.
pub struct KeyVaultSecretStore {
    vault_url: String,
    api_version: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}

impl KeyVaultSecretStore {
    /// Create a vault client.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built (e.g. no TLS backend).
    pub fn new(vault_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            vault_url: vault_url.into().trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
            client,
        })
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Attach a bearer token; empty tokens are ignored.
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token.filter(|token| !token.is_empty());
        self
    }

    fn secret_url(&self, name: &str) -> String {
        format!("{}/secrets/{}", self.vault_url, name)
    }
}

#[async_trait]
impl SecretStore for KeyVaultSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError> {
        let mut request = self
            .client
            .get(self.secret_url(name))
            .query(&[("api-version", self.api_version.as_str())]);

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SecretStoreError::RequestFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(SecretStoreError::NotFound(name.to_string())),
            status => {
                return Err(SecretStoreError::RequestFailed(format!(
                    "HTTP {} from vault",
                    status
                )))
            }
        }

        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|e| SecretStoreError::InvalidResponse(e.to_string()))?;

        Ok(bundle.value)
    }
}
