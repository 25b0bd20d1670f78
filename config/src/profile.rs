//! Flat key-value store for session-derived tokens and cached profile
//! fields.
//!
//! Keys are a closed enum rather than free strings so a typo cannot
//! silently create a new slot. The store holds the Apple authorization
//! code, which is a credential, so the file is persisted with owner-only
//! permissions.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use capsule_utils::{PersistMode, atomic_write};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKey {
    /// OAuth authorization code captured at sign-in, consumed by token
    /// refresh.
    AuthorizationCode,
    /// Cached display nickname.
    Nickname,
}

impl ProfileKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Nickname => "nickname",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("failed to read profile store: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write profile store: {0}")]
    Write(#[source] io::Error),
    #[error("profile store is corrupt: {0}")]
    Corrupt(#[from] toml::de::Error),
    #[error("failed to serialize profile store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Local key-value persistence, one TOML file of flat pairs.
///
/// Every mutation is written through immediately (the store is tiny and
/// mutations are rare: sign-in and nickname edits).
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    values: BTreeMap<ProfileKey, String>,
}

impl ProfileStore {
    /// Open the store at `path`, loading existing values if the file
    /// exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ProfileStoreError> {
        let path = path.into();
        let values: BTreeMap<ProfileKey, String> = match fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ProfileStoreError::Read(e)),
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "profile store opened");
        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, key: ProfileKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn set(&mut self, key: ProfileKey, value: impl Into<String>) -> Result<(), ProfileStoreError> {
        self.values.insert(key, value.into());
        self.flush()
    }

    /// Remove a key, returning its previous value.
    pub fn remove(&mut self, key: ProfileKey) -> Result<Option<String>, ProfileStoreError> {
        let previous = self.values.remove(&key);
        if previous.is_some() {
            self.flush()?;
        }
        Ok(previous)
    }

    /// Drop all stored values. Used on sign-out and account deletion.
    pub fn clear(&mut self) -> Result<(), ProfileStoreError> {
        self.values.clear();
        self.flush()
    }

    fn flush(&self) -> Result<(), ProfileStoreError> {
        let raw = toml::to_string(&self.values)?;
        atomic_write(&self.path, raw.as_bytes(), PersistMode::SensitiveOwnerOnly)
            .map_err(ProfileStoreError::Write)
    }
}
