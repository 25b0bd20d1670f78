//! Error taxonomy for the capsule core.
//!
//! Network and auth errors surface to the invoking layer as the terminal
//! result of that operation; nothing here retries internally. The one
//! deliberate exception is the open-count increment, whose failure is
//! logged and swallowed by the service.

use thiserror::Error;

use capsule_providers::NetworkError;
use capsule_types::CapsuleId;

/// Sign-in/out, account deletion, and token lifecycle failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in failed: {0}")]
    SignIn(String),
    #[error("sign-out failed: {0}")]
    SignOut(String),
    #[error("account deletion failed: {0}")]
    DeleteAccount(String),
    #[error("token operation failed: {0}")]
    Token(#[from] NetworkError),
}

/// A single image upload failure.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("storage rejected upload: {0}")]
    Storage(String),
    #[error("upload task failed: {0}")]
    Task(String),
}

/// Database collaborator failures.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("capsule write failed: {0}")]
    Commit(String),
    #[error("capsule read failed: {0}")]
    Read(String),
    #[error("record deletion failed: {0}")]
    Delete(String),
    #[error("capsule {0} not found")]
    NotFound(CapsuleId),
}

/// One failed upload inside a creation flow, identified by the image's
/// zero-based selection index so the caller can offer per-item retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub index: usize,
    pub reason: String,
}

/// Creation pipeline failures.
#[derive(Debug, Error)]
pub enum CreateError {
    /// One or more uploads failed. The barrier still fired - it counts
    /// settled uploads, not successful ones - so the flow reports every
    /// failing selection index instead of stalling.
    #[error("{} upload(s) failed", .failed.len())]
    Upload { failed: Vec<FailedUpload> },
    #[error("capsule commit failed: {0}")]
    Commit(#[from] WriteError),
    /// The flow's cancellation token fired before the commit.
    #[error("creation flow was cancelled")]
    Cancelled,
    /// A duplicate completion signal arrived after the commit was already
    /// issued. The database was not touched a second time.
    #[error("capsule was already committed by this flow")]
    AlreadyCommitted,
}
