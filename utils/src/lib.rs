//! Shared utilities for SpaceCapsule.

mod atomic_write;

pub use atomic_write::{PersistMode, atomic_write};
