use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{parse_env_or, ConfigError};

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name
    pub database: String,
    /// Username for authentication (optional)
    pub username: Option<String>,
    /// Password for authentication (optional)
    pub password: Option<String>,
    pub users_collection: String,
    pub contents_collection: String,
    pub cv_profiles_collection: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MONGO_URI: MongoDB connection URI (required)
    /// - MONGO_DATABASE: Database name (required)
    /// - MONGO_USERNAME / MONGO_PASSWORD: credentials (optional)
    /// - MONGO_USERS_COLLECTION, MONGO_CONTENTS_COLLECTION, MONGO_CV_COLLECTION (optional)
    /// - MONGO_POOL_SIZE: Connection pool size (defaults to 10)
    /// - MONGO_CONNECTION_TIMEOUT: Connection timeout in seconds (defaults to 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = env::var("MONGO_URI").map_err(|_| {
            error!("MONGO_URI environment variable not found");
            ConfigError::EnvVarNotFound("MONGO_URI".to_string())
        })?;
        debug!("MongoDB URI loaded");

        let database = env::var("MONGO_DATABASE").map_err(|_| {
            error!("MONGO_DATABASE environment variable not found");
            ConfigError::EnvVarNotFound("MONGO_DATABASE".to_string())
        })?;
        debug!("MongoDB database: {}", database);

        let username = env::var("MONGO_USERNAME").ok();
        let password = env::var("MONGO_PASSWORD").ok();
        if password.is_some() {
            debug!("MongoDB password provided");
        }

        let defaults = MongoConfig::default();
        let users_collection = env::var("MONGO_USERS_COLLECTION").unwrap_or(defaults.users_collection);
        let contents_collection = env::var("MONGO_CONTENTS_COLLECTION").unwrap_or(defaults.contents_collection);
        let cv_profiles_collection = env::var("MONGO_CV_COLLECTION").unwrap_or(defaults.cv_profiles_collection);

        if env::var("MONGO_POOL_SIZE").is_err() {
            warn!("MONGO_POOL_SIZE not set, using default: 10");
        }
        let pool_size = parse_env_or("MONGO_POOL_SIZE", 10u32)?;

        if env::var("MONGO_CONNECTION_TIMEOUT").is_err() {
            warn!("MONGO_CONNECTION_TIMEOUT not set, using default: 5 seconds");
        }
        let connection_timeout_secs = parse_env_or("MONGO_CONNECTION_TIMEOUT", 5u64)?;

        let config = MongoConfig {
            uri,
            database,
            username,
            password,
            users_collection,
            contents_collection,
            cv_profiles_collection,
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Create MongoConfig for testing
    pub fn from_test_env() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "devnet_test".to_string(),
            username: None,
            password: None,
            users_collection: "test_users".to_string(),
            contents_collection: "test_contents".to_string(),
            cv_profiles_collection: "test_cvprofiles".to_string(),
            pool_size: 2,
            connection_timeout_secs: 2,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }

        if self.database.is_empty() {
            error!("MongoDB database is empty");
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }

        for (name, value) in [
            ("users", &self.users_collection),
            ("contents", &self.contents_collection),
            ("cv profiles", &self.cv_profiles_collection),
        ] {
            if value.is_empty() {
                return Err(ConfigError::ValidationError(format!("MongoDB {} collection cannot be empty", name)));
            }
        }

        if self.pool_size == 0 {
            error!("MongoDB pool size is 0");
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }

        if self.connection_timeout_secs == 0 {
            error!("MongoDB connection timeout is 0");
            return Err(ConfigError::ValidationError("MongoDB connection timeout must be greater than 0".to_string()));
        }

        if let Some(ref user) = self.username {
            if user.is_empty() {
                return Err(ConfigError::ValidationError("MongoDB username cannot be empty if set".to_string()));
            }
        }
        if let Some(ref pass) = self.password {
            if pass.is_empty() {
                return Err(ConfigError::ValidationError("MongoDB password cannot be empty if set".to_string()));
            }
        }
        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "devnet".to_string(),
            username: None,
            password: None,
            users_collection: "users".to_string(),
            contents_collection: "contents".to_string(),
            cv_profiles_collection: "cvprofiles".to_string(),
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
