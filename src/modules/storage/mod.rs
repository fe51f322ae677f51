//! Storage module for issue photos
//!
//! The upload collaborator: given a photo, produce a durable URL for it.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// Stores an uploaded image and returns the URL it can be fetched from
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn store_image(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        owner: &str,
    ) -> Result<String, AppError>;
}
