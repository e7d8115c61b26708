//! Geographic primitives for submission locations and radius searches.

use std::fmt;

/// Mean Earth radius in metres used for great-circle distances.
pub const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

/// Radius applied when a nearby search does not specify one.
pub const DEFAULT_SEARCH_RADIUS_METRES: f64 = 10_000.0;

/// Upper bound on results returned by a nearby search.
pub const NEARBY_RESULT_LIMIT: usize = 20;

/// Validation errors for geographic input.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoValidationError {
    #[error("longitude must be a number between -180 and 180")]
    LongitudeOutOfRange,
    #[error("latitude must be a number between -90 and 90")]
    LatitudeOutOfRange,
    #[error("maxDistance must be a non-negative number of metres")]
    InvalidRadius,
}

/// WGS84 point, always handled in (longitude, latitude) order.
///
/// # Examples
/// ```
/// use loopwear::domain::GeoPoint;
///
/// let point = GeoPoint::new(-0.1276, 51.5072).unwrap();
/// assert_eq!(point.coordinates(), [-0.1276, 51.5072]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    /// Validate coordinate ranges and construct a point.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoValidationError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoValidationError::LongitudeOutOfRange);
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoValidationError::LatitudeOutOfRange);
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// GeoJSON coordinate pair.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_metres(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_METRES * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// Search radius in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRadius(f64);

impl SearchRadius {
    pub fn new(metres: f64) -> Result<Self, GeoValidationError> {
        if !metres.is_finite() || metres < 0.0 {
            return Err(GeoValidationError::InvalidRadius);
        }
        Ok(Self(metres))
    }

    pub fn metres(&self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(DEFAULT_SEARCH_RADIUS_METRES)
    }
}

/// Radius query around a point, capped at [`NEARBY_RESULT_LIMIT`] results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySearch {
    pub center: GeoPoint,
    pub radius: SearchRadius,
}

impl NearbySearch {
    /// Build a search, falling back to the default radius when none is given.
    pub fn new(center: GeoPoint, radius: Option<SearchRadius>) -> Self {
        Self {
            center,
            radius: radius.unwrap_or_default(),
        }
    }

    pub fn limit(&self) -> usize {
        NEARBY_RESULT_LIMIT
    }

    /// Whether `point` lies inside the search radius.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_metres(point) <= self.radius.metres()
    }
}
