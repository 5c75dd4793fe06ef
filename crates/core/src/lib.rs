//! Virtual Tourist Core - Shared types library.
//!
//! This crate provides common types used across all Virtual Tourist components:
//! - `virtual-tourist` - Pin/photo store and the photo fetch pipeline
//! - `cli` - Command-line collaborator (`vt`)
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, coordinates, bounding boxes, map regions,
//!   photo states and store change events

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
