//! Core domain types for SpaceCapsule.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the
//! application. Coordinate validation happens at this boundary: once a
//! [`GeoPoint`] exists it is finite and in range, so downstream ranking
//! code never needs to handle malformed coordinates.

mod capsule;
mod geo;
mod ids;
mod sort;

pub use capsule::{Capsule, CapsuleDraft, ListCapsuleCellItem};
pub use geo::{GeoError, GeoPoint};
pub use ids::{CapsuleId, UserId};
pub use sort::{SortPolicy, SortPolicyParseError};
