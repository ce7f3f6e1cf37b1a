pub mod app_conf;
pub mod jwt_conf;
pub mod log_conf;
pub mod mongo_conf;
pub mod upload_conf;

pub use app_conf::AppConfig;
pub use jwt_conf::JwtConfig;
pub use log_conf::LogConfig;
pub use mongo_conf::MongoConfig;
pub use upload_conf::UploadConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Reads an optional numeric variable, falling back to `default` when unset.
pub(crate) fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            tracing::error!("Invalid {} value: {}", key, raw);
            ConfigError::InvalidValue(format!("Invalid {} value", key))
        }),
        Err(_) => Ok(default),
    }
}
