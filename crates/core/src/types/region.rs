//! Persisted map viewport.

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// Errors that can occur when constructing a [`MapRegion`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    /// A span is zero, negative, or not finite.
    #[error("{axis} span must be a positive number of degrees (got {value})")]
    InvalidSpan {
        /// Which span was rejected (`latitude` or `longitude`).
        axis: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// The visible map area a collaborator last showed.
///
/// Restored on the next session so the map reopens where the user left it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMapRegion")]
pub struct MapRegion {
    center: Coordinate,
    latitude_delta: f64,
    longitude_delta: f64,
}

impl MapRegion {
    /// Create a region centered on `center` spanning the given deltas.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidSpan` if either delta is not a positive,
    /// finite number.
    pub fn new(
        center: Coordinate,
        latitude_delta: f64,
        longitude_delta: f64,
    ) -> Result<Self, RegionError> {
        validate_span("latitude", latitude_delta)?;
        validate_span("longitude", longitude_delta)?;

        Ok(Self {
            center,
            latitude_delta,
            longitude_delta,
        })
    }

    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    #[must_use]
    pub const fn latitude_delta(&self) -> f64 {
        self.latitude_delta
    }

    #[must_use]
    pub const fn longitude_delta(&self) -> f64 {
        self.longitude_delta
    }
}

/// Unvalidated wire form. The center validates itself; spans are checked
/// through [`MapRegion::new`].
#[derive(Deserialize)]
struct RawMapRegion {
    center: Coordinate,
    latitude_delta: f64,
    longitude_delta: f64,
}

impl TryFrom<RawMapRegion> for MapRegion {
    type Error = RegionError;

    fn try_from(raw: RawMapRegion) -> Result<Self, Self::Error> {
        Self::new(raw.center, raw.latitude_delta, raw.longitude_delta)
    }
}

fn validate_span(axis: &'static str, value: f64) -> Result<(), RegionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RegionError::InvalidSpan { axis, value })
    }
}
