use std::sync::Arc;

use auth::PasswordHasher;
use auth::SecretProvider;
use auth::TokenService;
use identity_service::config::Config;
use identity_service::config::DirectoryBackend;
use identity_service::domain::user::ports::UserServicePort;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserDirectory;
use identity_service::outbound::repositories::PostgresUserDirectory;
use identity_service::outbound::secrets::KeyVaultSecretStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        vault_url = %config.vault.url,
        directory_backend = ?config.directory.backend,
        "Configuration loaded"
    );

    let secret_store = KeyVaultSecretStore::new(&config.vault.url)?
        .with_api_version(&config.vault.api_version)
        .with_access_token(config.vault.access_token.clone());

    let secrets = Arc::new(
        SecretProvider::new(Arc::new(secret_store))
            .with_ttls(config.vault.ttl(), config.vault.fallback_ttl())
            .with_signing_secret_name(&config.vault.jwt_secret_name)
            .with_storage_secret_name(&config.vault.storage_secret_name),
    );
    let token_service = Arc::new(TokenService::new(Arc::clone(&secrets)));
    let password_hasher = PasswordHasher::with_cost(config.password.hash_cost);

    let user_service: Arc<dyn UserServicePort> = match config.directory.backend {
        DirectoryBackend::Postgres => {
            let connection_string = secrets.storage_connection_string().await?;
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.directory.max_connections)
                .connect(&connection_string)
                .await?;
            tracing::info!(
                max_connections = config.directory.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let directory = Arc::new(PostgresUserDirectory::new(pg_pool));
            Arc::new(UserService::new(directory, token_service, password_hasher))
        }
        DirectoryBackend::Memory => {
            tracing::warn!("Using in-memory directory; identities are lost on restart");
            let directory = Arc::new(InMemoryUserDirectory::new());
            Arc::new(UserService::new(directory, token_service, password_hasher))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    if let Err(e) = axum::serve(http_listener, create_router(user_service)).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
