//! Resolved application settings.
//!
//! The raw TOML shape is private; [`Settings::from_toml`] resolves it into
//! a validated value at the parse boundary. Existence of a `Settings` value
//! proves the token endpoints are well-formed and the reference coordinate
//! is in range.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use capsule_types::{GeoError, GeoPoint};

/// Apple's fixed OAuth token endpoint.
const DEFAULT_TOKEN_ENDPOINT: &str = "https://appleid.apple.com/auth/token";
/// Apple's fixed token revocation endpoint.
const DEFAULT_REVOKE_ENDPOINT: &str = "https://appleid.apple.com/auth/revoke";

// Default reference coordinate for distance ranking when no device
// location is available (Seoul city hall).
const DEFAULT_REFERENCE_LAT: f64 = 37.5665;
const DEFAULT_REFERENCE_LON: f64 = 126.9780;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("client_id must not be empty")]
    EmptyClientId,
    #[error("endpoint '{0}' must be an https URL")]
    InsecureEndpoint(String),
    #[error("invalid reference coordinate: {0}")]
    Reference(#[from] GeoError),
}

#[derive(Deserialize)]
struct RawSettings {
    client_id: String,
    signing_key_path: PathBuf,
    key_id: String,
    team_id: String,
    #[serde(default)]
    token_endpoint: Option<String>,
    #[serde(default)]
    revoke_endpoint: Option<String>,
    #[serde(default)]
    reference_latitude: Option<f64>,
    #[serde(default)]
    reference_longitude: Option<f64>,
}

/// Validated application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    client_id: String,
    signing_key_path: PathBuf,
    key_id: String,
    team_id: String,
    token_endpoint: String,
    revoke_endpoint: String,
    reference: GeoPoint,
}

impl Settings {
    pub fn from_toml(raw: &str) -> Result<Self, SettingsError> {
        let raw: RawSettings = toml::from_str(raw)?;
        if raw.client_id.trim().is_empty() {
            return Err(SettingsError::EmptyClientId);
        }

        let token_endpoint = raw
            .token_endpoint
            .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string());
        let revoke_endpoint = raw
            .revoke_endpoint
            .unwrap_or_else(|| DEFAULT_REVOKE_ENDPOINT.to_string());
        for endpoint in [&token_endpoint, &revoke_endpoint] {
            // Loopback is allowed so tests can point at a local mock server.
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://127.0.0.1") {
                return Err(SettingsError::InsecureEndpoint(endpoint.clone()));
            }
        }

        let reference = GeoPoint::new(
            raw.reference_latitude.unwrap_or(DEFAULT_REFERENCE_LAT),
            raw.reference_longitude.unwrap_or(DEFAULT_REFERENCE_LON),
        )?;

        Ok(Self {
            client_id: raw.client_id,
            signing_key_path: raw.signing_key_path,
            key_id: raw.key_id,
            team_id: raw.team_id,
            token_endpoint,
            revoke_endpoint,
            reference,
        })
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn signing_key_path(&self) -> &PathBuf {
        &self.signing_key_path
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[must_use]
    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    #[must_use]
    pub fn revoke_endpoint(&self) -> &str {
        &self.revoke_endpoint
    }

    /// Reference coordinate used for distance ranking.
    #[must_use]
    pub fn reference(&self) -> GeoPoint {
        self.reference
    }
}
