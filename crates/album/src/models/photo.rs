//! Photo domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use virtual_tourist_core::{PhotoId, PinId};

/// One entry of a pin's album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    /// Unique photo ID.
    pub id: PhotoId,
    /// Pin that owns this photo.
    pub pin_id: PinId,
    /// Remote image location (Flickr `url_m`).
    pub image_url: String,
    /// Downloaded image bytes, `None` while the photo is a stub.
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
    /// When the photo was added to the album.
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// Whether the image bytes are still missing.
    ///
    /// See `PhotoPipeline::photo_state` for the full state including
    /// in-progress downloads.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        self.image_data.is_none()
    }
}
