//! Pin domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use virtual_tourist_core::{Coordinate, PinId};

/// A bookmarked location.
///
/// Pins are created and deleted but never edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    /// Unique pin ID.
    pub id: PinId,
    /// Where the pin was dropped.
    pub coordinate: Coordinate,
    /// When the pin was created.
    pub created_at: DateTime<Utc>,
}
