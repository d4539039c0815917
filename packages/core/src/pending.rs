//! Pending change set accumulated by a staged editing session.
//!
//! Three collections that must stay mutually exclusive in effect: an id
//! slated for removal is pruned from `updates`, a staged addition that is
//! removed again before commit is simply dropped (never sent as a removal),
//! and additions parented under a removed subtree are dropped with it.

use std::collections::{BTreeMap, BTreeSet};

use crate::id::{CatalogId, EntryId, StagedId};
use crate::menu::EntryPatch;

/// A not-yet-sent addition: which catalog node to project, under which
/// menu entry. `parent` may reference another staged entry; the commit
/// engine resolves that to a real id from the parent's own add response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdd {
    pub local_id: StagedId,
    pub catalog_id: CatalogId,
    pub parent: Option<EntryId>,
}

/// The staged session's accumulated changes.
///
/// `additions` keeps insertion order (a staged parent always precedes its
/// staged children, since a child can only be added under an entry that is
/// already in the tree). `removals` holds persisted ids only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    additions: Vec<PendingAdd>,
    removals: BTreeSet<u64>,
    updates: BTreeMap<EntryId, EntryPatch>,
}

impl PendingChanges {
    /// Queues an addition.
    pub fn record_add(&mut self, add: PendingAdd) {
        self.additions.push(add);
    }

    /// Queues the removal of `target` whose detached subtree contained
    /// `subtree_ids` (the target itself included).
    ///
    /// Only a persisted target produces a remote removal; the store cascades
    /// descendants, so their ids are not queued. Staged ids anywhere in the
    /// subtree have their queued additions dropped instead, and additions
    /// parented under any removed id are dropped as collateral. Updates for
    /// every removed id are pruned.
    pub fn record_remove(&mut self, target: EntryId, subtree_ids: &[EntryId]) {
        if let Some(id) = target.persisted() {
            self.removals.insert(id);
        }
        let staged: BTreeSet<StagedId> = subtree_ids
            .iter()
            .filter_map(|id| match id {
                EntryId::Staged(local) => Some(*local),
                EntryId::Persisted(_) => None,
            })
            .collect();
        self.additions.retain(|add| {
            if staged.contains(&add.local_id) {
                return false;
            }
            match add.parent {
                Some(parent) => !subtree_ids.contains(&parent),
                None => true,
            }
        });
        for id in subtree_ids {
            self.updates.remove(id);
        }
    }

    /// Merges `patch` into the pending update for `id`, last write winning
    /// per field. Ignored for ids already slated for removal.
    pub fn record_update(&mut self, id: EntryId, patch: &EntryPatch) {
        if let Some(persisted) = id.persisted() {
            if self.removals.contains(&persisted) {
                return;
            }
        }
        self.updates.entry(id).or_default().merge(patch);
    }

    #[must_use]
    pub fn additions(&self) -> &[PendingAdd] {
        &self.additions
    }

    #[must_use]
    pub fn removals(&self) -> &BTreeSet<u64> {
        &self.removals
    }

    #[must_use]
    pub fn updates(&self) -> &BTreeMap<EntryId, EntryPatch> {
        &self.updates
    }

    /// Whether committing would issue zero remote calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.updates.is_empty()
    }

    pub fn clear(&mut self) {
        self.additions.clear();
        self.removals.clear();
        self.updates.clear();
    }
}
