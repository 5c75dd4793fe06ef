//! Geographic coordinate type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Coordinate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    /// Latitude is outside [-90, 90] or not a finite number.
    #[error("latitude must be between -90 and 90 degrees (got {0})")]
    LatitudeOutOfRange(f64),
    /// Longitude is outside [-180, 180] or not a finite number.
    #[error("longitude must be between -180 and 180 degrees (got {0})")]
    LongitudeOutOfRange(f64),
}

/// A point on the map in decimal degrees.
///
/// ## Constraints
///
/// - Latitude: finite, within [`Coordinate::LATITUDE_RANGE`]
/// - Longitude: finite, within [`Coordinate::LONGITUDE_RANGE`]
///
/// Equality is exact floating point equality, which is what pin lookup by
/// coordinate relies on.
///
/// ## Examples
///
/// ```
/// use virtual_tourist_core::Coordinate;
///
/// assert!(Coordinate::new(37.7749, -122.4194).is_ok());
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(0.0, -180.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Valid latitude range in degrees.
    pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

    /// Valid longitude range in degrees.
    pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

    /// Create a coordinate, validating both components.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite()
            || latitude < Self::LATITUDE_RANGE.0
            || latitude > Self::LATITUDE_RANGE.1
        {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }

        if !longitude.is_finite()
            || longitude < Self::LONGITUDE_RANGE.0
            || longitude > Self::LONGITUDE_RANGE.1
        {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Unvalidated wire form, checked through [`Coordinate::new`] on deserialize.
#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_rejects_latitude_out_of_range() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(90.5))
        );
    }

    #[test]
    fn test_rejects_longitude_out_of_range() {
        assert_eq!(
            Coordinate::new(0.0, 181.0),
            Err(CoordinateError::LongitudeOutOfRange(181.0))
        );
    }

    #[test]
    fn test_rejects_nan() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 10.0, "longitude": 20.0}"#);
        assert!(ok.is_ok());

        let bad: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 100.0, "longitude": 20.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_display() {
        let coordinate = Coordinate::new(37.7749, -122.4194).unwrap();
        assert_eq!(coordinate.to_string(), "(37.7749, -122.4194)");
    }
}
