use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::util::error::ServiceError;
use crate::util::storage::{check_image, FileStorage, IncomingFile};

#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload_one(&self, file: Option<IncomingFile>) -> Result<String, ServiceError>;
    async fn upload_many(&self, files: Vec<IncomingFile>) -> Result<Vec<String>, ServiceError>;
    fn max_files(&self) -> usize;
}

pub struct UploadServiceImpl {
    pub storage: Arc<dyn FileStorage>,
}

impl UploadServiceImpl {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl UploadService for UploadServiceImpl {
    #[instrument(skip(self, file))]
    async fn upload_one(&self, file: Option<IncomingFile>) -> Result<String, ServiceError> {
        let file = file.ok_or_else(|| ServiceError::InvalidInput("No file uploaded".to_string()))?;
        let url = self.storage.store_image(&file, None).await?;
        info!(url = %url, "File uploaded");
        Ok(url)
    }

    #[instrument(skip(self, files), fields(count = files.len()))]
    async fn upload_many(&self, files: Vec<IncomingFile>) -> Result<Vec<String>, ServiceError> {
        if files.is_empty() {
            return Err(ServiceError::InvalidInput("No files uploaded".to_string()));
        }
        if files.len() > self.storage.max_files() {
            return Err(ServiceError::InvalidInput(format!(
                "Too many files. Maximum is {}.",
                self.storage.max_files()
            )));
        }
        // reject the whole batch before anything is written
        for file in &files {
            check_image(file, self.storage.max_file_size())?;
        }
        let mut urls = Vec::with_capacity(files.len());
        for file in &files {
            urls.push(self.storage.store_image(file, None).await?);
        }
        info!(count = urls.len(), "Files uploaded");
        Ok(urls)
    }

    fn max_files(&self) -> usize {
        self.storage.max_files()
    }
}
