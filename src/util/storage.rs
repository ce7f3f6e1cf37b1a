use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use tracing::{debug, error, info, instrument};

use crate::config::UploadConfig;
use crate::util::error::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Only image files are allowed!")]
    NotAnImage,
    #[error("File is too large. Maximum file size is {0}MB.")]
    TooLarge(usize),
    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotAnImage => ServiceError::InvalidInput(err.to_string()),
            StorageError::TooLarge(_) => ServiceError::PayloadTooLarge(err.to_string()),
            StorageError::Io(e) => ServiceError::InternalError(e.to_string()),
        }
    }
}

/// One uploaded file as read from a multipart body.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores an image and returns its public URL.
    async fn store_image(&self, file: &IncomingFile, subdir: Option<&str>) -> Result<String, StorageError>;
    fn max_file_size(&self) -> usize;
    fn max_files(&self) -> usize;
}

/// Writes files under the configured upload directory.
pub struct LocalFileStorage {
    root: PathBuf,
    public_prefix: String,
    max_file_size: usize,
    max_files: usize,
}

impl LocalFileStorage {
    /// Creates the upload directory once.
    pub fn new(config: &UploadConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.upload_dir)?;
        info!(dir = %config.upload_dir.display(), "Upload directory ready");
        Ok(LocalFileStorage {
            root: config.upload_dir.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_file_size: config.max_file_size,
            max_files: config.max_files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// `{field}-{millis}-{random}{ext}`, extension taken from the client's file name.
pub fn stored_file_name(field: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}-{}{}", field, Utc::now().timestamp_millis(), suffix, ext)
}

pub fn check_image(file: &IncomingFile, max_file_size: usize) -> Result<(), StorageError> {
    if !file.content_type.starts_with("image/") {
        return Err(StorageError::NotAnImage);
    }
    if file.data.len() > max_file_size {
        return Err(StorageError::TooLarge(max_file_size / (1024 * 1024)));
    }
    Ok(())
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    #[instrument(skip(self, file), fields(field = %file.field, size = file.data.len()))]
    async fn store_image(&self, file: &IncomingFile, subdir: Option<&str>) -> Result<String, StorageError> {
        check_image(file, self.max_file_size)?;

        let name = stored_file_name(&file.field, &file.file_name);
        let (dir, url) = match subdir {
            Some(sub) => (self.root.join(sub), format!("{}/{}/{}", self.public_prefix, sub, name)),
            None => (self.root.clone(), format!("{}/{}", self.public_prefix, name)),
        };
        tokio::fs::create_dir_all(&dir).await?;
        if let Err(e) = tokio::fs::write(dir.join(&name), &file.data).await {
            error!("Failed to write upload {}: {}", name, e);
            return Err(e.into());
        }
        debug!(url = %url, "Image stored");
        Ok(url)
    }

    fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    fn max_files(&self) -> usize {
        self.max_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, size: usize) -> IncomingFile {
        IncomingFile {
            field: "image".into(),
            file_name: "Cat.PNG".into(),
            content_type: content_type.into(),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn test_stored_file_name_shape() {
        let name = stored_file_name("image", "Cat.PNG");
        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.split('-').count(), 3);
        assert!(!stored_file_name("images", "noext").contains('.'));
    }

    #[test]
    fn test_check_image_limits() {
        assert!(check_image(&file("image/png", 10), 100).is_ok());
        assert!(matches!(check_image(&file("text/plain", 10), 100), Err(StorageError::NotAnImage)));
        assert!(matches!(check_image(&file("image/png", 101), 100), Err(StorageError::TooLarge(_))));
    }

    #[tokio::test]
    async fn test_store_image_writes_under_subdir() {
        let dir = std::env::temp_dir().join(format!("devnet-storage-{}", uuid::Uuid::new_v4()));
        let storage = LocalFileStorage::new(&UploadConfig::from_test_env(dir.clone())).unwrap();
        let url = storage.store_image(&file("image/png", 4), Some("profiles")).await.unwrap();
        assert!(url.starts_with("/uploads/profiles/image-"));
        let name = url.rsplit('/').next().unwrap();
        assert!(dir.join("profiles").join(name).exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
