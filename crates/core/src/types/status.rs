//! Photo lifecycle states.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Where a photo is in its download lifecycle.
///
/// `Stub -> Downloading -> Materialized`. `Downloading` is never persisted;
/// a photo only returns to `Stub` by being deleted and recreated on reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhotoState {
    /// URL known, no image bytes yet.
    #[default]
    Stub,
    /// A download is in flight.
    Downloading,
    /// Image bytes are stored.
    Materialized,
}

impl PhotoState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::Downloading => "downloading",
            Self::Materialized => "materialized",
        }
    }

    /// Whether the image bytes are available locally.
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::Materialized)
    }
}

impl fmt::Display for PhotoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
