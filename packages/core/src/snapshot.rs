//! Snapshot decoding: the wire boundary between the remote store and the
//! in-memory trees.
//!
//! The remote store returns both trees in one nested payload. Wire structs
//! are closed records (`deny_unknown_fields`) so shape drift is caught at
//! the boundary instead of surfacing as mystery state later. Decoding
//! recomputes everything derivable: depths from nesting, sibling positions
//! re-sorted and renumbered contiguously, and catalog `in_menu` flags from
//! the decoded menu, so the membership invariant holds from the first frame.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{CatalogKind, CatalogNode, CatalogTree};
use crate::id::{CatalogId, EntryId};
use crate::menu::{MenuEntry, MenuTree};

/// Shape violations in a snapshot payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("duplicate catalog node id {0}")]
    DuplicateCatalogNode(CatalogId),
    #[error("duplicate menu entry id {0}")]
    DuplicateEntry(u64),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A catalog node as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogNodeWire {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
    pub kind: CatalogKind,
    #[serde(default)]
    pub children: Vec<CatalogNodeWire>,
}

/// A menu entry as returned by the remote store (snapshot and add
/// responses alike).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MenuEntryWire {
    pub id: u64,
    pub catalog_node_id: u64,
    #[serde(default)]
    pub parent_id: Option<u64>,
    pub position: u32,
    pub active: bool,
    #[serde(default)]
    pub show_children: bool,
    #[serde(default)]
    pub children: Vec<MenuEntryWire>,
}

/// The combined snapshot payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotWire {
    pub collections_tree: Vec<CatalogNodeWire>,
    pub mega_menu: Vec<MenuEntryWire>,
}

// ---------------------------------------------------------------------------
// Decoded snapshot
// ---------------------------------------------------------------------------

/// Authoritative decoded state: both trees, membership flags derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub catalog: CatalogTree,
    pub menu: MenuTree,
}

impl Snapshot {
    /// Pairs a catalog with a menu, deriving the catalog's `in_menu` flags
    /// from the menu's live entries. A menu entry referencing a catalog id
    /// absent from the tree is tolerated with a warning; catalog and menu
    /// are edited independently and may briefly drift.
    #[must_use]
    pub fn new(mut catalog: CatalogTree, menu: MenuTree) -> Self {
        for catalog_id in menu.live_catalog_ids() {
            if !catalog.mark_included(catalog_id, true) {
                warn!(%catalog_id, "menu references a catalog node missing from the snapshot");
            }
        }
        Self { catalog, menu }
    }
}

impl SnapshotWire {
    /// Validates and decodes the payload into in-memory trees.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when an id appears twice in either tree.
    pub fn decode(self) -> Result<Snapshot, SnapshotError> {
        let mut catalog_seen = HashSet::new();
        let catalog_roots = self
            .collections_tree
            .into_iter()
            .map(|wire| decode_catalog(wire, &mut catalog_seen))
            .collect::<Result<Vec<_>, _>>()?;

        let mut entry_seen = HashSet::new();
        let mut menu_roots = self
            .mega_menu
            .into_iter()
            .map(|wire| decode_entry(wire, None, &mut entry_seen))
            .collect::<Result<Vec<_>, _>>()?;
        sort_and_renumber(&mut menu_roots);

        Ok(Snapshot::new(
            CatalogTree::from_roots(catalog_roots),
            MenuTree::from_roots(menu_roots),
        ))
    }
}

fn decode_catalog(
    wire: CatalogNodeWire,
    seen: &mut HashSet<u64>,
) -> Result<CatalogNode, SnapshotError> {
    if !seen.insert(wire.id) {
        return Err(SnapshotError::DuplicateCatalogNode(CatalogId(wire.id)));
    }
    let children = wire
        .children
        .into_iter()
        .map(|child| decode_catalog(child, seen))
        .collect::<Result<Vec<_>, _>>()?;
    let mut node = CatalogNode::new(CatalogId(wire.id), wire.name, wire.slug, wire.kind);
    node.children = children;
    Ok(node)
}

fn decode_entry(
    wire: MenuEntryWire,
    parent: Option<EntryId>,
    seen: &mut HashSet<u64>,
) -> Result<MenuEntry, SnapshotError> {
    if !seen.insert(wire.id) {
        return Err(SnapshotError::DuplicateEntry(wire.id));
    }
    let id = EntryId::Persisted(wire.id);
    let children = wire
        .children
        .into_iter()
        .map(|child| decode_entry(child, Some(id), seen))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MenuEntry {
        id,
        catalog_id: CatalogId(wire.catalog_node_id),
        parent_id: parent,
        position: wire.position,
        active: wire.active,
        show_children: wire.show_children,
        children,
    })
}

/// Stable-sorts each sibling list by stored position, then renumbers to
/// index. Stored positions may carry gaps after a partially failed commit
/// on the server side.
fn sort_and_renumber(entries: &mut Vec<MenuEntry>) {
    entries.sort_by_key(|e| e.position);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.position = u32::try_from(index).unwrap_or(u32::MAX);
        sort_and_renumber(&mut entry.children);
    }
}
