//! Configuration loading and local persistence for SpaceCapsule.
//!
//! Raw TOML deserialization structs (with `Option` fields) stay private in
//! this crate; loaders resolve them into validated types at the parse
//! boundary. The [`ProfileStore`] is the app's only local persisted state:
//! flat key/value pairs for session-derived tokens and cached profile
//! fields.

mod profile;
mod settings;

pub use profile::{ProfileKey, ProfileStore, ProfileStoreError};
pub use settings::{Settings, SettingsError};

use std::path::PathBuf;

/// Default data directory for local state (`~/.spacecapsule`).
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".spacecapsule"))
}
