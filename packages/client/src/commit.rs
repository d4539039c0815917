//! Commit engine: ordered replay of a staged session's pending changes.
//!
//! Strict order: removals, then additions in insertion order, then updates.
//! Each item is attempted independently; a failure is recorded and reported
//! but never aborts the remaining items. The caller (the session) always
//! refetches the authoritative snapshot afterwards, so the visible tree
//! converges with the store no matter which items failed.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use meganav_core::{
    CatalogId, EntryId, MenuStore, PendingChanges, StagedId, StoreError,
};

use crate::observer::SessionObserver;

/// One replayed operation, for failure reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOp {
    Remove { id: u64 },
    Add { catalog_id: CatalogId, parent: Option<EntryId> },
    Update { id: u64 },
}

/// Why a single commit item failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The item's parent was itself staged and its add call failed, so no
    /// real parent id exists to reference.
    #[error("staged parent {0} was never created")]
    UnresolvedParent(StagedId),
}

/// A single failed commit item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFailure {
    pub op: CommitOp,
    pub error: CommitError,
}

/// Outcome of a commit: how many items were attempted, which failed, and
/// whether the mandatory post-commit snapshot refresh itself failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub attempted: usize,
    pub failures: Vec<CommitFailure>,
    pub refresh_error: Option<StoreError>,
}

impl CommitReport {
    /// True when every item and the refresh succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.refresh_error.is_none()
    }
}

/// Pause inserted between consecutive store calls. The first call goes out
/// immediately; a zero delay disables the pause entirely.
struct Throttle {
    delay: Duration,
    ticked: bool,
}

impl Throttle {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            ticked: false,
        }
    }

    async fn pause(&mut self) {
        if self.ticked && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.ticked = true;
    }
}

/// Replays `pending` against the store in the fixed order. Does not
/// refetch; the session owns that step.
pub(crate) async fn replay(
    store: &dyn MenuStore,
    pending: &PendingChanges,
    throttle: Duration,
    observer: Option<&dyn SessionObserver>,
) -> CommitReport {
    let mut report = CommitReport::default();
    let mut throttle = Throttle::new(throttle);

    let fail = |report: &mut CommitReport, op: CommitOp, error: CommitError| {
        warn!(?op, %error, "commit item failed");
        if let Some(observer) = observer {
            observer.commit_item_failed(&op, &error);
        }
        report.failures.push(CommitFailure { op, error });
    };

    // 1. Removals.
    for &id in pending.removals() {
        throttle.pause().await;
        report.attempted += 1;
        if let Err(error) = store.remove_entry(id).await {
            fail(&mut report, CommitOp::Remove { id }, error.into());
        }
    }

    // 2. Additions, insertion order. A staged parent always precedes its
    // staged children in the list, so its real id is known (or known to be
    // missing) by the time a child references it.
    let mut resolved: HashMap<StagedId, u64> = HashMap::new();
    for add in pending.additions() {
        let op = CommitOp::Add {
            catalog_id: add.catalog_id,
            parent: add.parent,
        };
        report.attempted += 1;
        let parent_id = match add.parent {
            None => None,
            Some(EntryId::Persisted(id)) => Some(id),
            Some(EntryId::Staged(local)) => match resolved.get(&local) {
                Some(&id) => Some(id),
                None => {
                    fail(&mut report, op, CommitError::UnresolvedParent(local));
                    continue;
                }
            },
        };
        throttle.pause().await;
        match store.add_entry(add.catalog_id.0, parent_id).await {
            Ok(created) => {
                resolved.insert(add.local_id, created.id);
            }
            Err(error) => fail(&mut report, op, error.into()),
        }
    }

    // 3. Updates, persisted ids only. Patches keyed by a staged id cover
    // fields the add call cannot carry; the post-commit refresh picks up
    // the store's defaults instead.
    for (&id, patch) in pending.updates() {
        let Some(persisted) = id.persisted() else {
            debug!(%id, "dropping staged-keyed patch at commit");
            continue;
        };
        if patch.is_empty() {
            continue;
        }
        throttle.pause().await;
        report.attempted += 1;
        if let Err(error) = store.update_entry(persisted, patch).await {
            fail(&mut report, CommitOp::Update { id: persisted }, error.into());
        }
    }

    report
}
