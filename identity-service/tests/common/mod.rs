use std::sync::Arc;

use auth::PasswordHasher;
use auth::SecretProvider;
use auth::StaticSecretStore;
use auth::TokenService;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserDirectory;
use serde_json::json;
use serde_json::Value;

pub const SIGNING_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "Passw0rd!";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub directory: Arc<InMemoryUserDirectory>,
    pub token_service: Arc<TokenService>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let store = StaticSecretStore::new().with_secret("jwt-secret", SIGNING_SECRET);
        Self::spawn_with_store(store).await
    }

    /// Spawn against a given secret store, with no environment fallback
    pub async fn spawn_with_store(store: StaticSecretStore) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

        let secrets = SecretProvider::new(Arc::new(store)).with_environment(|_| None);
        let token_service = Arc::new(TokenService::new(Arc::new(secrets)));
        let directory = Arc::new(InMemoryUserDirectory::new());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&directory),
            Arc::clone(&token_service),
            PasswordHasher::with_cost(4),
        ));

        let router = create_router(user_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            directory,
            token_service,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register a guest and return the response body
    pub async fn register(&self, user_id: &str, email: &str) -> Value {
        let response = self
            .post("/api/users")
            .json(&json!({
                "userId": user_id,
                "role": "guest",
                "name": "Alice",
                "email": email,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }

    /// Register a guest and return the issued token
    pub async fn register_token(&self, user_id: &str, email: &str) -> String {
        let body = self.register(user_id, email).await;
        body["data"]["token"]
            .as_str()
            .expect("Token missing from response")
            .to_string()
    }
}
