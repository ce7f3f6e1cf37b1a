use std::env;
use tracing::{debug, info};

use crate::config::{parse_env_or, ConfigError};

const DEFAULT_JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any origin.
    pub cors_origins: Vec<String>,
    pub json_body_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_env_or("APP_PORT", 8080u16)?;
        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let json_body_limit = parse_env_or("JSON_BODY_LIMIT_BYTES", DEFAULT_JSON_BODY_LIMIT)?;
        debug!(host = %host, port, origins = ?cors_origins, "Application configuration");

        let config = AppConfig { host, port, cors_origins, json_body_limit };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("APP_HOST cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationError("APP_PORT must be greater than 0".to_string()));
        }
        if self.json_body_limit == 0 {
            return Err(ConfigError::ValidationError("JSON body limit must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:3001".to_string()],
            json_body_limit: DEFAULT_JSON_BODY_LIMIT,
        }
    }
}
