//! Driving port for apparel submissions.

use async_trait::async_trait;

use crate::domain::{Apparel, ApparelDetails, Error, GeoPoint, ImageUpload, UserId};

/// Everything needed to record one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ApparelSubmissionRequest {
    pub owner: UserId,
    pub details: ApparelDetails,
    pub image: ImageUpload,
    pub location: GeoPoint,
}

/// Domain use-case port for submitting apparel for recycling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApparelSubmission: Send + Sync {
    /// Upload the image, persist the record and reward the submitter.
    async fn submit(&self, request: ApparelSubmissionRequest) -> Result<Apparel, Error>;
}
