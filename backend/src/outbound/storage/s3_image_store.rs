//! Amazon S3 implementation of the `ImageStore` port.
//!
//! Objects are written under `apparel/` with a millisecond timestamp prefix
//! and a public-read ACL. The returned URL is the public base URL joined
//! with the object key.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageUpload, ImageUrl};

const KEY_PREFIX: &str = "apparel";
const MAX_NAME_LEN: usize = 100;

/// Where uploads land and how they are addressed publicly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    bucket: String,
    public_base_url: String,
}

impl S3Location {
    /// Address objects through the standard virtual-hosted bucket URL.
    pub fn new(bucket: impl Into<String>, region: &str) -> Self {
        let bucket = bucket.into();
        let public_base_url = format!("https://{bucket}.s3.{region}.amazonaws.com");
        Self {
            bucket,
            public_base_url,
        }
    }

    /// Override the public base URL, e.g. for a CDN or a local S3 emulator.
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = base.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

/// Image store writing to a single S3 bucket.
#[derive(Clone)]
pub struct S3ImageStore {
    client: Client,
    location: S3Location,
    clock: Arc<dyn Clock>,
}

impl S3ImageStore {
    pub fn new(client: Client, location: S3Location, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            location,
            clock,
        }
    }

    fn key_for(&self, file_name: &str) -> String {
        object_key(self.clock.utc().timestamp_millis(), file_name)
    }
}

/// Reduce a client-supplied file name to a safe object key segment.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '-'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    let trimmed = cleaned.trim_matches(|ch| ch == '.' || ch == '-');
    if trimmed.is_empty() {
        "image".to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn object_key(millis: i64, file_name: &str) -> String {
    format!("{KEY_PREFIX}/{millis}-{}", sanitize_file_name(file_name))
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn store(&self, image: ImageUpload) -> Result<ImageUrl, ImageStoreError> {
        let key = self.key_for(image.file_name());
        let content_type = image.content_type().to_owned();
        let size = image.bytes().len();

        self.client
            .put_object()
            .bucket(self.location.bucket())
            .key(&key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(image.into_bytes()))
            .send()
            .await
            .map_err(|err| {
                let message = aws_sdk_s3::error::DisplayErrorContext(&err).to_string();
                warn!(%key, error = %message, "s3 upload failed");
                ImageStoreError::upload(message)
            })?;

        debug!(%key, size, "image stored");
        Ok(ImageUrl::new(self.location.url_for(&key)))
    }
}
