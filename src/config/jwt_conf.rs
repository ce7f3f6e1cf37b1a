use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{parse_env_or, ConfigError};

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub jwt_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
    /// Refresh token expiration time in minutes
    pub refresh_token_expiration: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required, 32+ chars)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 1440)
    /// - JWT_REFRESH_TOKEN_EXPIRY: Refresh token expiration in minutes (defaults to 10080 = 1 week)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            error!("JWT_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("JWT_SECRET".to_string())
        })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        if env::var("JWT_ACCESS_TOKEN_EXPIRY").is_err() {
            warn!("JWT_ACCESS_TOKEN_EXPIRY not set, using default: 1440 minutes");
        }
        let access_token_expiration = parse_env_or("JWT_ACCESS_TOKEN_EXPIRY", 1440i64)?;

        if env::var("JWT_REFRESH_TOKEN_EXPIRY").is_err() {
            warn!("JWT_REFRESH_TOKEN_EXPIRY not set, using default: 10080 minutes (1 week)");
        }
        let refresh_token_expiration = parse_env_or("JWT_REFRESH_TOKEN_EXPIRY", 10080i64)?;

        let config = JwtConfig { jwt_secret, access_token_expiration, refresh_token_expiration };
        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        debug!("Validating JWT configuration");

        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError("JWT secret must be at least 32 characters long".to_string()));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::ValidationError("Access token expiration must be greater than 0".to_string()));
        }

        if self.refresh_token_expiration <= 0 {
            return Err(ConfigError::ValidationError("Refresh token expiration must be greater than 0".to_string()));
        }

        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }
        Ok(())
    }

    /// JWT configuration for tests; never reads the environment.
    pub fn from_test_env() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough".to_string(),
            access_token_expiration: 15,
            refresh_token_expiration: 60,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: String::new(),
            access_token_expiration: 1440,
            refresh_token_expiration: 10080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_valid() {
        assert!(JwtConfig::from_test_env().validate().is_ok());
    }

    #[test]
    fn test_default_has_no_secret() {
        assert!(JwtConfig::default().validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = JwtConfig::from_test_env();
        config.jwt_secret = "short".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut config = JwtConfig::from_test_env();
        config.access_token_expiration = 0;
        assert!(config.validate().is_err());
    }
}
