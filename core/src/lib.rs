//! Core domain logic for SpaceCapsule.
//!
//! Two cooperating subsystems live here:
//!
//! - [`ranking`] - pure ordering of capsule list projections under a
//!   [`capsule_types::SortPolicy`] and a reference coordinate.
//! - [`pipeline`] - the capsule creation pipeline: concurrent per-image
//!   upload fan-out, index-tagged accumulation, a settled-count barrier,
//!   selection-order reassembly, and an at-most-once database commit.
//!
//! Around them: the collaborator seams ([`collaborators`]) the core
//! consumes, the [`service`] orchestrating fetch/rank/open flows, and the
//! [`feed`] carrying list updates to subscribers with explicit replay
//! semantics. All services are constructed explicitly and injected; there
//! is no ambient global state.

pub mod collaborators;
pub mod errors;
pub mod feed;
pub mod pipeline;
pub mod ranking;
pub mod service;

pub use collaborators::{AuthGateway, CapsuleStore, Credential, ImageStore, Session};
pub use errors::{AuthError, CreateError, FailedUpload, UploadError, WriteError};
pub use feed::{CapsuleEvent, CapsuleEvents, CapsuleFeed};
pub use pipeline::CreationPipeline;
pub use ranking::rank;
pub use service::CapsuleService;
