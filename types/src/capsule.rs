//! Capsule records and their list projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::ids::{CapsuleId, UserId};

/// A buried time capsule as stored by the database collaborator.
///
/// Invariant: `images` ordering reflects the user's original selection
/// order and is preserved end-to-end through upload. The record is written
/// once on submit; only `open_count` mutates afterwards (server-side), and
/// deletion happens only through full account deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub uuid: CapsuleId,
    pub user_id: UserId,
    pub images: Vec<String>,
    pub title: String,
    pub description: String,
    pub geopoint: GeoPoint,
    /// When the capsule was created and closed.
    pub closed_date: DateTime<Utc>,
    /// The date being commemorated.
    pub memory_date: DateTime<Utc>,
    pub simple_address: String,
    pub open_count: u64,
}

impl Capsule {
    /// List/map projection of this capsule.
    #[must_use]
    pub fn to_cell_item(&self) -> ListCapsuleCellItem {
        ListCapsuleCellItem {
            uuid: self.uuid,
            thumbnail_image_url: self.images.first().cloned(),
            address: self.simple_address.clone(),
            closed_date: self.closed_date,
            memory_date: self.memory_date,
            coordinate: self.geopoint,
        }
    }
}

/// Everything the creation flow collects before the image URLs exist.
///
/// Turned into a [`Capsule`] by the creation pipeline once every upload has
/// settled.
#[derive(Debug, Clone, PartialEq)]
pub struct CapsuleDraft {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub geopoint: GeoPoint,
    pub memory_date: DateTime<Utc>,
    pub simple_address: String,
}

impl CapsuleDraft {
    /// Seal the draft with the assembled, selection-ordered image URLs.
    #[must_use]
    pub fn into_capsule(self, images: Vec<String>, closed_date: DateTime<Utc>) -> Capsule {
        Capsule {
            uuid: CapsuleId::new(),
            user_id: self.user_id,
            images,
            title: self.title,
            description: self.description,
            geopoint: self.geopoint,
            closed_date,
            memory_date: self.memory_date,
            simple_address: self.simple_address,
            open_count: 0,
        }
    }
}

/// Read-only projection of a [`Capsule`] for list/map display.
///
/// Recomputed on every fetch; carries no identity beyond the source
/// capsule's uuid.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCapsuleCellItem {
    pub uuid: CapsuleId,
    pub thumbnail_image_url: Option<String>,
    pub address: String,
    pub closed_date: DateTime<Utc>,
    pub memory_date: DateTime<Utc>,
    pub coordinate: GeoPoint,
}
