//! Store change events.
//!
//! Published by the store after each committed mutation so collaborators can
//! refresh whatever they render without polling.

use serde::{Deserialize, Serialize};

use super::id::{PhotoId, PinId};

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// The entity a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityRef {
    Pin { pin_id: PinId },
    Photo { pin_id: PinId, photo_id: PhotoId },
    MapRegion,
}

/// A single committed change in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreEvent {
    pub kind: ChangeKind,
    pub entity: EntityRef,
}

impl StoreEvent {
    #[must_use]
    pub const fn pin(kind: ChangeKind, pin_id: PinId) -> Self {
        Self {
            kind,
            entity: EntityRef::Pin { pin_id },
        }
    }

    #[must_use]
    pub const fn photo(kind: ChangeKind, pin_id: PinId, photo_id: PhotoId) -> Self {
        Self {
            kind,
            entity: EntityRef::Photo { pin_id, photo_id },
        }
    }

    #[must_use]
    pub const fn map_region() -> Self {
        Self {
            kind: ChangeKind::Updated,
            entity: EntityRef::MapRegion,
        }
    }

    /// The pin this event concerns, if any.
    #[must_use]
    pub const fn pin_id(&self) -> Option<PinId> {
        match self.entity {
            EntityRef::Pin { pin_id } | EntityRef::Photo { pin_id, .. } => Some(pin_id),
            EntityRef::MapRegion => None,
        }
    }
}
