use std::env;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{parse_env_or, ConfigError};

/// Local image storage settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory files are written to
    pub upload_dir: PathBuf,
    /// URL prefix the directory is served under
    pub public_prefix: String,
    /// Per-file limit in bytes
    pub max_file_size: usize,
    /// Files accepted by the multi-upload endpoint
    pub max_files: usize,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading upload configuration from environment variables");
        let defaults = UploadConfig::default();
        let upload_dir = env::var("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir);
        let max_file_size = parse_env_or("UPLOAD_MAX_FILE_SIZE", defaults.max_file_size)?;
        let max_files = parse_env_or("UPLOAD_MAX_FILES", defaults.max_files)?;
        debug!(dir = %upload_dir.display(), max_file_size, max_files, "Upload configuration");

        let config = UploadConfig { upload_dir, public_prefix: defaults.public_prefix, max_file_size, max_files };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("UPLOAD_DIR cannot be empty".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::ValidationError("UPLOAD_MAX_FILE_SIZE must be greater than 0".to_string()));
        }
        if self.max_files == 0 {
            return Err(ConfigError::ValidationError("UPLOAD_MAX_FILES must be greater than 0".to_string()));
        }
        if !self.public_prefix.starts_with('/') {
            return Err(ConfigError::ValidationError("Upload public prefix must start with '/'".to_string()));
        }
        Ok(())
    }

    /// Request body limit for the upload routes: every file at full size plus multipart framing.
    pub fn body_limit(&self) -> usize {
        self.max_file_size * self.max_files + 64 * 1024
    }

    pub fn from_test_env(dir: PathBuf) -> Self {
        UploadConfig { upload_dir: dir, ..UploadConfig::default() }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            upload_dir: PathBuf::from("uploads"),
            public_prefix: "/uploads".to_string(),
            max_file_size: 5 * 1024 * 1024,
            max_files: 5,
        }
    }
}
