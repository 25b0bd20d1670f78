//! Capsule creation pipeline.
//!
//! Turns a user's ordered image selection plus metadata into one durably
//! stored capsule record:
//!
//! 1. fan-out: every payload is uploaded concurrently, tagged with its
//!    zero-based selection index;
//! 2. accumulate: a single consumer drains completions into the pending
//!    upload set (index -> URL), the only serialized access path to that
//!    state;
//! 3. barrier: fires when every upload has *settled* - succeeded, failed,
//!    or panicked - so a failed upload reports instead of starving the
//!    flow;
//! 4. order reconstruction: ascending-index projection of the pending set
//!    restores the user's selection order regardless of completion order;
//! 5. commit: at most one database write per flow, enforced by a commit
//!    guard even if the completion signal fires twice.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use capsule_types::{Capsule, CapsuleDraft};

use crate::collaborators::{CapsuleStore, ImageStore};
use crate::errors::{CreateError, FailedUpload};

/// At-most-once latch for the commit step.
#[derive(Debug, Default)]
struct CommitGuard(AtomicBool);

impl CommitGuard {
    /// Returns true exactly once.
    fn try_take(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

/// Coordinates one or more capsule creation flows against the storage and
/// database collaborators.
///
/// Cancelling the pipeline's token aborts in-flight uploads of every
/// running flow; a flow that observed cancellation never commits.
pub struct CreationPipeline {
    images: Arc<dyn ImageStore>,
    capsules: Arc<dyn CapsuleStore>,
    cancel: CancellationToken,
}

impl CreationPipeline {
    #[must_use]
    pub fn new(images: Arc<dyn ImageStore>, capsules: Arc<dyn CapsuleStore>) -> Self {
        Self {
            images,
            capsules,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that cancels this pipeline's flows. Intended to be tied to
    /// the owning view's lifecycle so navigating away mid-upload tears the
    /// flow down.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one creation flow to completion.
    ///
    /// `payloads` is the user's selection in order; the committed capsule's
    /// `images` field matches that order for any permutation of upload
    /// completion times. An empty selection skips the fan-out and barrier
    /// entirely and commits an empty image list.
    pub async fn create(
        &self,
        draft: CapsuleDraft,
        payloads: Vec<Vec<u8>>,
    ) -> Result<Capsule, CreateError> {
        if self.cancel.is_cancelled() {
            return Err(CreateError::Cancelled);
        }

        let total = payloads.len();
        let urls = if payloads.is_empty() {
            Vec::new()
        } else {
            self.upload_all(payloads).await?
        };
        debug_assert_eq!(urls.len(), total);

        let capsule = draft.into_capsule(urls, Utc::now());
        let guard = CommitGuard::default();
        self.commit_once(&guard, &capsule).await?;
        tracing::debug!(uuid = %capsule.uuid, images = capsule.images.len(), "capsule committed");
        Ok(capsule)
    }

    /// Fan out all uploads, wait for every one to settle, and reassemble
    /// the URLs in selection order.
    async fn upload_all(&self, payloads: Vec<Vec<u8>>) -> Result<Vec<String>, CreateError> {
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::new();
        for (index, payload) in payloads.into_iter().enumerate() {
            let store = Arc::clone(&self.images);
            let handle = tasks.spawn(async move { (index, store.upload(payload).await) });
            task_index.insert(handle.id(), index);
        }

        // Pending upload set: selection index -> uploaded URL. Only this
        // loop writes to it, which serializes concurrent completions.
        let mut pending: BTreeMap<usize, String> = BTreeMap::new();
        let mut failed: Vec<FailedUpload> = Vec::new();

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(CreateError::Cancelled);
                }
                settled = tasks.join_next_with_id() => {
                    match settled {
                        // Settled-count barrier: the set draining empty
                        // means all uploads are accounted for.
                        None => break,
                        Some(Ok((_, (index, Ok(url))))) => {
                            pending.insert(index, url);
                        }
                        Some(Ok((_, (index, Err(e))))) => {
                            failed.push(FailedUpload {
                                index,
                                reason: e.to_string(),
                            });
                        }
                        Some(Err(join_err)) => {
                            let index = task_index
                                .get(&join_err.id())
                                .copied()
                                .unwrap_or(usize::MAX);
                            failed.push(FailedUpload {
                                index,
                                reason: join_err.to_string(),
                            });
                        }
                    }
                }
            }
        }

        if !failed.is_empty() {
            failed.sort_by_key(|f| f.index);
            tracing::warn!(failed = failed.len(), "creation flow had failed uploads");
            return Err(CreateError::Upload { failed });
        }

        // BTreeMap iterates in ascending index order, restoring the
        // user's selection order.
        Ok(pending.into_values().collect())
    }

    async fn commit_once(&self, guard: &CommitGuard, capsule: &Capsule) -> Result<(), CreateError> {
        if !guard.try_take() {
            return Err(CreateError::AlreadyCommitted);
        }
        self.capsules
            .write_capsule(capsule)
            .await
            .map_err(CreateError::Commit)?;
        Ok(())
    }
}
