//! Typed observer interface scoped to one editing session.
//!
//! The surrounding admin panel wants to react to tree changes (refresh the
//! picker, show a toast on a failed commit item). Rather than an ambient
//! broadcast bus, the session notifies a single registered observer through
//! this trait. All methods default to no-ops so implementors pick what they
//! care about.

use meganav_core::{CatalogId, EntryId};

use crate::commit::{CommitError, CommitOp};

/// Observer for session-level events. Used as `Arc<dyn SessionObserver>`.
pub trait SessionObserver: Send + Sync {
    /// A menu entry was added to the local tree (staged or direct).
    fn entry_added(&self, id: EntryId, catalog_id: CatalogId) {
        let _ = (id, catalog_id);
    }

    /// A menu entry and its descendants left the local tree.
    fn entry_removed(&self, id: EntryId) {
        let _ = id;
    }

    /// One commit item failed; the remaining items still run.
    fn commit_item_failed(&self, op: &CommitOp, error: &CommitError) {
        let _ = (op, error);
    }
}
