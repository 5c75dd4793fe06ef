//! Bounding box sent to the photo search API.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// A latitude/longitude rectangle, clamped to the valid coordinate ranges.
///
/// Renders as `minLon,minLat,maxLon,maxLat`, the order the Flickr `bbox`
/// parameter expects.
///
/// ## Examples
///
/// ```
/// use virtual_tourist_core::{BoundingBox, Coordinate};
///
/// let center = Coordinate::new(89.5, 179.5).unwrap();
/// let bbox = BoundingBox::around(center, BoundingBox::DEFAULT_HALF_SPAN);
///
/// assert_eq!(bbox.max_latitude(), 90.0);
/// assert_eq!(bbox.max_longitude(), 180.0);
/// assert_eq!(bbox.to_string(), "178.5,88.5,180,90");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_longitude: f64,
    min_latitude: f64,
    max_longitude: f64,
    max_latitude: f64,
}

impl BoundingBox {
    /// Half-width and half-height of the search box, in degrees.
    pub const DEFAULT_HALF_SPAN: f64 = 1.0;

    /// Build a box extending `half_span` degrees in every direction from
    /// `center`, clamped to [-90, 90] latitude and [-180, 180] longitude.
    #[must_use]
    pub fn around(center: Coordinate, half_span: f64) -> Self {
        let (min_lat_bound, max_lat_bound) = Coordinate::LATITUDE_RANGE;
        let (min_lon_bound, max_lon_bound) = Coordinate::LONGITUDE_RANGE;

        Self {
            min_longitude: (center.longitude() - half_span).max(min_lon_bound),
            min_latitude: (center.latitude() - half_span).max(min_lat_bound),
            max_longitude: (center.longitude() + half_span).min(max_lon_bound),
            max_latitude: (center.latitude() + half_span).min(max_lat_bound),
        }
    }

    #[must_use]
    pub const fn min_longitude(&self) -> f64 {
        self.min_longitude
    }

    #[must_use]
    pub const fn min_latitude(&self) -> f64 {
        self.min_latitude
    }

    #[must_use]
    pub const fn max_longitude(&self) -> f64 {
        self.max_longitude
    }

    #[must_use]
    pub const fn max_latitude(&self) -> f64 {
        self.max_latitude
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_longitude, self.min_latitude, self.max_longitude, self.max_latitude
        )
    }
}
