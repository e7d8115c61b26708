//! Driven port for the object store holding apparel photos.

use async_trait::async_trait;

use crate::domain::{ImageUpload, ImageUrl};

use super::define_port_error;

define_port_error! {
    /// Errors raised by object store adapters.
    pub enum ImageStoreError {
        /// The store rejected or failed the upload.
        Upload { message: String } => "image upload failed: {message}",
    }
}

/// Uploads binary image payloads and returns a durable URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, image: ImageUpload) -> Result<ImageUrl, ImageStoreError>;
}
