use std::sync::Arc;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use reviewdesk::{
    config::{Config, StoreBackend},
    db::{cache, DBClient, InMemoryStore, StoreHandle},
    mail::sendmail::ResendNotifier,
    routes::create_router,
    service::{
        notification_service::{LogNotifier, Notifier},
        storage_service::PublicBucketStorage,
    },
    AppState,
};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reviewdesk=debug,tower_http=info")),
        )
        .init();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let store: StoreHandle = match config.store_backend {
        StoreBackend::Postgres => match DBClient::connect(&config.database_url, 10).await {
            Ok(db_client) => {
                tracing::info!("Connection to the database is successful");
                Arc::new(db_client)
            }
            Err(err) => {
                tracing::error!("Failed to connect to the database: {:?}", err);
                std::process::exit(1);
            }
        },
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let redis = match config.redis_url.as_deref() {
        Some(redis_url) => cache::connect(redis_url).await,
        None => None,
    };

    let notifier: Arc<dyn Notifier> = match config.resend_api_key.clone() {
        Some(api_key) => Arc::new(ResendNotifier::new(api_key, config.from_email.clone())),
        None => {
            tracing::warn!("RESEND_API_KEY not set; notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    let storage = Arc::new(PublicBucketStorage::new(config.storage_public_base_url.clone()));

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, store, redis, notifier, storage));
    let app = create_router(app_state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {}", port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("Server is running on http://localhost:{}", port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
