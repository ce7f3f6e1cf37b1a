use std::env;

use crate::config::ConfigError;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_dir: String,
    /// Console filter used when RUST_LOG is unset
    pub console_level: String,
    pub file_level: String,
    pub error_file_level: String,
    pub to_files: bool,
}

impl LogConfig {
    // Read before the subscriber exists, so nothing here logs.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = LogConfig::default();
        let to_files = match env::var("LOG_TO_FILES") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidValue(format!("Invalid LOG_TO_FILES value: {}", raw))),
            },
            Err(_) => defaults.to_files,
        };
        let config = LogConfig {
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            console_level: env::var("CONSOLE_LOG_LEVEL").unwrap_or(defaults.console_level),
            file_level: env::var("FILE_LOG_LEVEL").unwrap_or(defaults.file_level),
            error_file_level: env::var("ERROR_FILE_LOG_LEVEL").unwrap_or(defaults.error_file_level),
            to_files,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.to_files && self.log_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError("LOG_DIR cannot be empty when file logging is on".to_string()));
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_dir: "logs".to_string(),
            console_level: "info,devnet_backend=debug".to_string(),
            file_level: "debug".to_string(),
            error_file_level: "error".to_string(),
            to_files: true,
        }
    }
}
