//! Core types for Virtual Tourist.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod bbox;
pub mod coordinate;
pub mod event;
pub mod id;
pub mod region;
pub mod status;

pub use bbox::BoundingBox;
pub use coordinate::{Coordinate, CoordinateError};
pub use event::{ChangeKind, EntityRef, StoreEvent};
pub use id::*;
pub use region::{MapRegion, RegionError};
pub use status::PhotoState;

/// Number of photos kept in a pin's album after a fetch.
pub const ALBUM_SIZE: usize = 15;
