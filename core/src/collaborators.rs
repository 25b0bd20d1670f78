//! Collaborator seams the core consumes.
//!
//! Auth, storage, and database are vendor-backed services on the device.
//! The core only sees these traits; production wires the vendor SDK
//! adapters in at the composition root, tests inject in-memory fakes.
//! Everything is object-safe and injected as `Arc<dyn _>` - no global
//! singletons.

use async_trait::async_trait;

use capsule_types::{Capsule, CapsuleId, UserId};

use crate::errors::{AuthError, UploadError, WriteError};

/// OAuth credential assembled by the sign-in UI.
#[derive(Debug, Clone)]
pub struct Credential {
    pub provider_id: String,
    pub id_token: String,
    pub raw_nonce: String,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

/// Authentication collaborator.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, credential: Credential) -> Result<Session, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    async fn delete_account(&self, user: &UserId) -> Result<(), AuthError>;
}

/// File storage collaborator. One call per image; calls are independently
/// concurrent.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload one image payload, resolving to its public URL.
    async fn upload(&self, payload: Vec<u8>) -> Result<String, UploadError>;
}

/// Database collaborator.
#[async_trait]
pub trait CapsuleStore: Send + Sync {
    async fn write_capsule(&self, capsule: &Capsule) -> Result<(), WriteError>;
    /// Server-side counter bump on capsule open. Callers treat this as
    /// best-effort.
    async fn increment_open_count(&self, id: CapsuleId) -> Result<(), WriteError>;
    async fn read_capsules(&self, user: &UserId) -> Result<Vec<Capsule>, WriteError>;
    async fn delete_user_records(&self, user: &UserId) -> Result<(), WriteError>;
}
