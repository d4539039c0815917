//! The editing session: owner of all client state and the only mutator.
//!
//! A session is either **closed** (direct mode: every action goes to the
//! remote store immediately and local state is refreshed from the snapshot
//! endpoint on success) or **open** (staged mode: actions mutate the local
//! trees and a pending change set, and nothing reaches the store until
//! [`MenuSession::commit`]). Leaving staged mode via
//! [`MenuSession::discard`] restores the trees captured when the session
//! opened.
//!
//! Structural misses — an action naming an id that is not in the tree —
//! are logged no-ops, never errors: the id may have left the tree as
//! collateral of an earlier removal.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use meganav_core::{
    reorder, CatalogId, CatalogTree, EntryId, EntryPatch, MenuEntry, MenuStore, MenuTree,
    PendingAdd, PendingChanges, ReorderItem, ReorderOutcome, Snapshot, StagedIdGen, StoreError,
};

use crate::commit::{self, CommitReport};
use crate::config::SessionConfig;
use crate::observer::SessionObserver;

/// Session-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("remote store: {0}")]
    Store(#[from] StoreError),
    /// `commit` was called while no staged session was open.
    #[error("no staged session is open")]
    NotStaged,
}

/// State held only while a staged session is open.
struct Staging {
    /// Both trees as they were at `begin`, for `discard`. Catalog included:
    /// membership flags mutate alongside the menu while staged.
    original: Snapshot,
    pending: PendingChanges,
    ids: StagedIdGen,
}

/// The mega-menu editing session.
///
/// Owns the catalog tree, the menu tree, and (while open) the pending
/// change set. All mutation goes through the methods here; callers are
/// expected to serialize actions on the same entry.
pub struct MenuSession {
    store: Arc<dyn MenuStore>,
    config: SessionConfig,
    observer: Option<Arc<dyn SessionObserver>>,
    catalog: CatalogTree,
    menu: MenuTree,
    staging: Option<Staging>,
}

impl MenuSession {
    /// Creates a closed session with empty trees; call
    /// [`load`](Self::load) to populate it.
    #[must_use]
    pub fn new(store: Arc<dyn MenuStore>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            observer: None,
            catalog: CatalogTree::default(),
            menu: MenuTree::default(),
            staging: None,
        }
    }

    /// Registers the observer notified of tree changes and commit failures.
    pub fn set_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogTree {
        &self.catalog
    }

    #[must_use]
    pub fn menu(&self) -> &MenuTree {
        &self.menu
    }

    /// The pending change set, while a staged session is open.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingChanges> {
        self.staging.as_ref().map(|s| &s.pending)
    }

    #[must_use]
    pub fn is_staged(&self) -> bool {
        self.staging.is_some()
    }

    // -----------------------------------------------------------------------
    // Snapshot lifecycle
    // -----------------------------------------------------------------------

    /// Fetches the authoritative snapshot and replaces local state.
    ///
    /// # Errors
    ///
    /// On fetch failure the previous state is left untouched.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        let snapshot = self.store.fetch_snapshot().await?;
        self.install(snapshot);
        Ok(())
    }

    fn install(&mut self, snapshot: Snapshot) {
        self.catalog = snapshot.catalog;
        self.menu = snapshot.menu;
    }

    // -----------------------------------------------------------------------
    // Mode transitions
    // -----------------------------------------------------------------------

    /// Opens a staged session: snapshots the current trees for `discard`
    /// and starts with an empty pending set. No-op if already open.
    pub fn begin(&mut self) {
        if self.staging.is_some() {
            debug!("staged session already open");
            return;
        }
        self.staging = Some(Staging {
            original: Snapshot {
                catalog: self.catalog.clone(),
                menu: self.menu.clone(),
            },
            pending: PendingChanges::default(),
            ids: StagedIdGen::new(),
        });
    }

    /// Closes a staged session without committing: restores the trees
    /// captured at `begin` and drops the pending set. No remote calls.
    pub fn discard(&mut self) {
        let Some(staging) = self.staging.take() else {
            debug!("discard with no staged session open");
            return;
        };
        self.catalog = staging.original.catalog;
        self.menu = staging.original.menu;
    }

    /// Closes a staged session by replaying the pending set against the
    /// store (removals, then additions, then updates; failures reported
    /// per item, never aborting the rest) and then refetching the
    /// snapshot — the refetch runs even if every item failed.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotStaged`] when no staged session is open. Item
    /// failures are not errors; they are listed in the returned report.
    pub async fn commit(&mut self) -> Result<CommitReport, SessionError> {
        let staging = self.staging.take().ok_or(SessionError::NotStaged)?;
        let mut report = commit::replay(
            self.store.as_ref(),
            &staging.pending,
            self.config.commit_throttle,
            self.observer.as_deref(),
        )
        .await;
        match self.store.fetch_snapshot().await {
            Ok(snapshot) => self.install(snapshot),
            Err(error) => {
                warn!(%error, "post-commit snapshot refresh failed");
                report.refresh_error = Some(error);
            }
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Projects a catalog node into the menu under `parent` (top level for
    /// `None`), appended after the existing siblings.
    ///
    /// Staged: the new entry carries a staged id and is queued for commit.
    /// Direct: the add call goes out immediately and local state is
    /// refreshed from the store. Returns the new entry's id, or `None`
    /// when the parent id is unknown (a structural no-op).
    pub async fn add(
        &mut self,
        catalog_id: CatalogId,
        parent: Option<EntryId>,
    ) -> Result<Option<EntryId>, SessionError> {
        if let Some(staging) = self.staging.as_mut() {
            let local = staging.ids.mint();
            let id = EntryId::Staged(local);
            if !self.menu.insert_child(parent, MenuEntry::new(id, catalog_id)) {
                debug!(?parent, "add under unknown parent ignored");
                return Ok(None);
            }
            if !self.catalog.mark_included(catalog_id, true) {
                warn!(%catalog_id, "added entry references a catalog node missing locally");
            }
            staging.pending.record_add(PendingAdd {
                local_id: local,
                catalog_id,
                parent,
            });
            if let Some(observer) = &self.observer {
                observer.entry_added(id, catalog_id);
            }
            return Ok(Some(id));
        }

        let parent_id = match parent {
            None => None,
            Some(id) => match id.persisted() {
                Some(persisted) => {
                    if self.menu.find(id).is_none() {
                        debug!(%id, "add under unknown parent ignored");
                        return Ok(None);
                    }
                    Some(persisted)
                }
                None => {
                    debug!(%id, "staged parent outside a staged session ignored");
                    return Ok(None);
                }
            },
        };
        let created = self.store.add_entry(catalog_id.0, parent_id).await?;
        let id = EntryId::Persisted(created.id);
        self.load().await?;
        if let Some(observer) = &self.observer {
            observer.entry_added(id, catalog_id);
        }
        Ok(Some(id))
    }

    /// Removes an entry and all of its descendants. Unknown ids are no-ops.
    ///
    /// Staged: a persisted target is queued for removal (descendants are
    /// cascaded by the store); a staged target's queued addition is dropped
    /// instead and never produces a remote call.
    pub async fn remove(&mut self, id: EntryId) -> Result<(), SessionError> {
        if let Some(staging) = self.staging.as_mut() {
            let Some(subtree) = self.menu.remove_with_descendants(id) else {
                debug!(%id, "remove of unknown entry ignored");
                return Ok(());
            };
            staging.pending.record_remove(id, &subtree.entry_ids());
            for catalog_id in subtree.catalog_ids() {
                self.catalog.mark_included(catalog_id, false);
            }
            if let Some(observer) = &self.observer {
                observer.entry_removed(id);
            }
            return Ok(());
        }

        let Some(persisted) = id.persisted() else {
            debug!(%id, "staged id outside a staged session ignored");
            return Ok(());
        };
        if self.menu.find(id).is_none() {
            debug!(%id, "remove of unknown entry ignored");
            return Ok(());
        }
        self.store.remove_entry(persisted).await?;
        self.load().await?;
        if let Some(observer) = &self.observer {
            observer.entry_removed(id);
        }
        Ok(())
    }

    /// Flips the entry's `active` flag.
    pub async fn toggle_active(&mut self, id: EntryId) -> Result<(), SessionError> {
        self.toggle(id, ToggleField::Active).await
    }

    /// Flips the entry's `show_children` flag.
    pub async fn toggle_show_children(&mut self, id: EntryId) -> Result<(), SessionError> {
        self.toggle(id, ToggleField::ShowChildren).await
    }

    async fn toggle(&mut self, id: EntryId, field: ToggleField) -> Result<(), SessionError> {
        let Some(entry) = self.menu.find(id) else {
            debug!(%id, "toggle of unknown entry ignored");
            return Ok(());
        };
        let patch = match field {
            ToggleField::Active => EntryPatch::active(!entry.active),
            ToggleField::ShowChildren => EntryPatch::show_children(!entry.show_children),
        };

        if let Some(staging) = self.staging.as_mut() {
            self.menu.patch(id, &patch);
            staging.pending.record_update(id, &patch);
            return Ok(());
        }

        let Some(persisted) = id.persisted() else {
            debug!(%id, "staged id outside a staged session ignored");
            return Ok(());
        };
        // Only the flipped field goes out; local state changes via the
        // post-success refresh, not optimistically.
        self.store.update_entry(persisted, &patch).await?;
        self.load().await
    }

    /// Moves the entry one slot up among its siblings. First entry: no-op.
    pub async fn move_up(&mut self, id: EntryId) -> Result<(), SessionError> {
        self.reorder_with(id, |siblings| reorder::move_up(siblings, id))
            .await
    }

    /// Moves the entry one slot down among its siblings. Last entry: no-op.
    pub async fn move_down(&mut self, id: EntryId) -> Result<(), SessionError> {
        self.reorder_with(id, |siblings| reorder::move_down(siblings, id))
            .await
    }

    /// Moves the entry to an arbitrary index among its siblings.
    pub async fn move_to(&mut self, id: EntryId, index: usize) -> Result<(), SessionError> {
        self.reorder_with(id, |siblings| reorder::move_to(siblings, id, index))
            .await
    }

    async fn reorder_with<F>(&mut self, id: EntryId, apply: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Vec<MenuEntry>) -> Option<ReorderOutcome>,
    {
        let Some(parent) = self.menu.find(id).map(|e| e.parent_id) else {
            debug!(%id, "reorder of unknown entry ignored");
            return Ok(());
        };

        if let Some(staging) = self.staging.as_mut() {
            let Some(siblings) = self.menu.siblings_mut(parent) else {
                return Ok(());
            };
            let Some(outcome) = apply(siblings) else {
                return Ok(());
            };
            for update in &outcome.changed {
                staging
                    .pending
                    .record_update(update.id, &EntryPatch::position(update.position));
            }
            return Ok(());
        }

        // Direct mode computes the new order on a scratch copy: on failure
        // the local tree must stay untouched, and on success the refresh
        // brings in the authoritative order anyway.
        let Some(siblings) = self.menu.siblings(parent) else {
            return Ok(());
        };
        let mut scratch = siblings.to_vec();
        let Some(outcome) = apply(&mut scratch) else {
            return Ok(());
        };
        let items: Vec<ReorderItem> = outcome
            .order
            .iter()
            .filter_map(|update| {
                update.id.persisted().map(|id| ReorderItem {
                    id,
                    position: update.position,
                })
            })
            .collect();
        self.store.reorder(&items).await?;
        self.load().await
    }
}

#[derive(Debug, Clone, Copy)]
enum ToggleField {
    Active,
    ShowChildren,
}
