//! Apparel submissions.
//!
//! An apparel record is created once per submission and never changes
//! afterwards. It always belongs to exactly one user.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::geo::GeoPoint;
use super::user::UserId;

/// Maximum length of the short text attributes (`type`, `size`).
pub const SHORT_ATTRIBUTE_MAX: usize = 64;
/// Maximum length of the free-text description.
pub const DESCRIPTION_MAX: usize = 2_000;
/// Maximum accepted image payload in bytes.
pub const IMAGE_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Validation errors for apparel input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApparelValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("condition must be one of new, like_new, good, fair, poor")]
    UnknownCondition,
    #[error("image is required")]
    MissingImage,
    #[error("image must be at most {max} bytes")]
    ImageTooLarge { max: usize },
}

/// Stable apparel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApparelId(Uuid);

impl ApparelId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ApparelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wear condition reported by the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl Condition {
    /// Every condition in display order.
    pub const ALL: [Self; 5] = [Self::New, Self::LikeNew, Self::Good, Self::Fair, Self::Poor];

    /// Wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like_new",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl FromStr for Condition {
    type Err = ApparelValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|condition| condition.as_str() == normalised)
            .ok_or(ApparelValidationError::UnknownCondition)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn bounded_text(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ApparelValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApparelValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(ApparelValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Descriptive attributes of a submitted garment.
///
/// # Examples
/// ```
/// use loopwear::domain::{ApparelDetails, Condition};
///
/// let details = ApparelDetails::try_from_parts("jacket", "like new", "M", "Denim jacket").unwrap();
/// assert_eq!(details.condition(), Condition::LikeNew);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApparelDetails {
    apparel_type: String,
    condition: Condition,
    size: String,
    description: String,
}

impl ApparelDetails {
    /// Validate the raw text attributes.
    pub fn try_from_parts(
        apparel_type: &str,
        condition: &str,
        size: &str,
        description: &str,
    ) -> Result<Self, ApparelValidationError> {
        Ok(Self {
            apparel_type: bounded_text("type", apparel_type, SHORT_ATTRIBUTE_MAX)?,
            condition: condition.parse()?,
            size: bounded_text("size", size, SHORT_ATTRIBUTE_MAX)?,
            description: bounded_text("description", description, DESCRIPTION_MAX)?,
        })
    }

    pub fn apparel_type(&self) -> &str {
        self.apparel_type.as_str()
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn size(&self) -> &str {
        self.size.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Raw image payload destined for the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate presence and size of an uploaded image.
    ///
    /// A missing file name falls back to `image`; a missing content type to
    /// `application/octet-stream`.
    pub fn new(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, ApparelValidationError> {
        if bytes.is_empty() {
            return Err(ApparelValidationError::MissingImage);
        }
        if bytes.len() > IMAGE_MAX_BYTES {
            return Err(ApparelValidationError::ImageTooLarge {
                max: IMAGE_MAX_BYTES,
            });
        }
        let file_name = file_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("image")
            .to_owned();
        let content_type = content_type
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("application/octet-stream")
            .to_owned();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Durable URL of a stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted apparel record.
#[derive(Debug, Clone, PartialEq)]
pub struct Apparel {
    pub id: ApparelId,
    pub owner: UserId,
    pub details: ApparelDetails,
    pub image_url: ImageUrl,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("new", Condition::New)]
    #[case("like_new", Condition::LikeNew)]
    #[case("Like New", Condition::LikeNew)]
    #[case("like-new", Condition::LikeNew)]
    #[case(" GOOD ", Condition::Good)]
    #[case("fair", Condition::Fair)]
    #[case("poor", Condition::Poor)]
    fn parses_conditions(#[case] raw: &str, #[case] expected: Condition) {
        assert_eq!(raw.parse::<Condition>().expect("known condition"), expected);
    }

    #[rstest]
    fn rejects_unknown_condition() {
        assert_eq!(
            "shredded".parse::<Condition>().expect_err("unknown"),
            ApparelValidationError::UnknownCondition
        );
    }

    #[rstest]
    #[case("", "good", "M", "desc", "type")]
    #[case("shirt", "good", " ", "desc", "size")]
    #[case("shirt", "good", "M", "", "description")]
    fn rejects_blank_attributes(
        #[case] apparel_type: &str,
        #[case] condition: &str,
        #[case] size: &str,
        #[case] description: &str,
        #[case] field: &'static str,
    ) {
        let err = ApparelDetails::try_from_parts(apparel_type, condition, size, description)
            .expect_err("blank attribute");
        assert_eq!(err, ApparelValidationError::EmptyField { field });
    }

    #[rstest]
    fn rejects_overlong_description() {
        let description = "x".repeat(DESCRIPTION_MAX + 1);
        let err = ApparelDetails::try_from_parts("shirt", "good", "M", &description)
            .expect_err("too long");
        assert_eq!(
            err,
            ApparelValidationError::FieldTooLong {
                field: "description",
                max: DESCRIPTION_MAX
            }
        );
    }

    #[rstest]
    fn image_requires_bytes() {
        assert_eq!(
            ImageUpload::new(Some("a.jpg"), Some("image/jpeg"), Vec::new()).expect_err("empty"),
            ApparelValidationError::MissingImage
        );
    }

    #[rstest]
    fn image_defaults_missing_metadata() {
        let image = ImageUpload::new(None, Some("  "), vec![1, 2, 3]).expect("valid image");
        assert_eq!(image.file_name(), "image");
        assert_eq!(image.content_type(), "application/octet-stream");
        assert_eq!(image.bytes().len(), 3);
    }
}
