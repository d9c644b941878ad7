// config.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub app_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    // Identity provider
    pub identity_jwt_secret: String,
    // Checkout provider
    pub checkout_webhook_secret: String,
    pub webhook_tolerance_secs: i64,
    // Outbound mail
    pub resend_api_key: Option<String>,
    pub from_email: String,
    // Audio storage
    pub storage_public_base_url: String,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        let store_backend = match std::env::var("STORE").unwrap_or_else(|_| "postgres".to_string()).as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid { key: "STORE", value: other.to_string() });
            }
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => required("DATABASE_URL")?,
            StoreBackend::Memory => std::env::var("DATABASE_URL").unwrap_or_default(),
        };

        let identity_jwt_secret = required("IDENTITY_JWT_SECRET")?;
        let checkout_webhook_secret = required("CHECKOUT_WEBHOOK_SECRET")?;
        let app_url = required("APP_URL")?;

        let port = parse_or("PORT", 8000u16)?;
        let webhook_tolerance_secs = parse_or("WEBHOOK_TOLERANCE_SECS", 300i64)?;

        let redis_url = optional("REDIS_URL");
        let resend_api_key = optional("RESEND_API_KEY");
        let from_email = std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "Review Desk <noreply@reviewdesk.app>".to_string());

        let storage_public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("{}/media", app_url.trim_end_matches('/')));

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            store_backend,
            database_url,
            redis_url,
            app_url,
            port,
            cors_origins,
            identity_jwt_secret,
            checkout_webhook_secret,
            webhook_tolerance_secs,
            resend_api_key,
            from_email,
            storage_public_base_url,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}
