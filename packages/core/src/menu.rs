//! Menu tree: the navigation entries projected from the catalog.
//!
//! The menu hierarchy is independent of the catalog hierarchy: an entry's
//! parent is another menu entry, not a catalog node, and the tree is
//! typically much shallower (two levels). Every mutation of the tree goes
//! through the primitives on [`MenuTree`] so the sibling-position invariant
//! (contiguous, zero-based, unique) holds after each operation.

use serde::Serialize;

use crate::id::{CatalogId, EntryId};

// ---------------------------------------------------------------------------
// EntryPatch
// ---------------------------------------------------------------------------

/// Partial field update for a menu entry.
///
/// Serializes as the JSON body of an update call, omitting absent fields,
/// so a lone `active` toggle sends `{"active": ...}` and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_children: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl EntryPatch {
    /// Patch setting only `active`.
    #[must_use]
    pub fn active(value: bool) -> Self {
        Self {
            active: Some(value),
            ..Self::default()
        }
    }

    /// Patch setting only `show_children`.
    #[must_use]
    pub fn show_children(value: bool) -> Self {
        Self {
            show_children: Some(value),
            ..Self::default()
        }
    }

    /// Patch setting only `position`.
    #[must_use]
    pub fn position(value: u32) -> Self {
        Self {
            position: Some(value),
            ..Self::default()
        }
    }

    /// Merges `later` into `self`, last write winning per field.
    pub fn merge(&mut self, later: &EntryPatch) {
        if later.active.is_some() {
            self.active = later.active;
        }
        if later.show_children.is_some() {
            self.show_children = later.show_children;
        }
        if later.position.is_some() {
            self.position = later.position;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.show_children.is_none() && self.position.is_none()
    }
}

// ---------------------------------------------------------------------------
// MenuEntry
// ---------------------------------------------------------------------------

/// A navigation-menu row referencing exactly one catalog node.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub id: EntryId,
    /// The catalog node this entry projects. Never null.
    pub catalog_id: CatalogId,
    /// Parent menu entry (not a catalog node), `None` for top-level rows.
    pub parent_id: Option<EntryId>,
    /// Zero-based, contiguous and unique among siblings.
    pub position: u32,
    /// Whether the entry is shown.
    pub active: bool,
    /// Whether subordinate entries render. Only meaningful when the
    /// referenced catalog node is a category.
    pub show_children: bool,
    /// Sorted by `position`.
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    /// Creates a detached top-level entry; parent and position are assigned
    /// by [`MenuTree::insert_child`].
    #[must_use]
    pub fn new(id: EntryId, catalog_id: CatalogId) -> Self {
        Self {
            id,
            catalog_id,
            parent_id: None,
            position: 0,
            active: true,
            show_children: false,
            children: Vec::new(),
        }
    }

    fn apply(&mut self, patch: &EntryPatch) {
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(show_children) = patch.show_children {
            self.show_children = show_children;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
    }

    /// Ids of this entry and every descendant, depth-first.
    #[must_use]
    pub fn entry_ids(&self) -> Vec<EntryId> {
        let mut out = Vec::new();
        collect_entry_ids(self, &mut out);
        out
    }

    /// Catalog ids referenced by this entry and every descendant.
    #[must_use]
    pub fn catalog_ids(&self) -> Vec<CatalogId> {
        let mut out = Vec::new();
        collect_catalog_ids(self, &mut out);
        out
    }
}

fn collect_entry_ids(entry: &MenuEntry, out: &mut Vec<EntryId>) {
    out.push(entry.id);
    for child in &entry.children {
        collect_entry_ids(child, out);
    }
}

fn collect_catalog_ids(entry: &MenuEntry, out: &mut Vec<CatalogId>) {
    out.push(entry.catalog_id);
    for child in &entry.children {
        collect_catalog_ids(child, out);
    }
}

// ---------------------------------------------------------------------------
// MenuTree
// ---------------------------------------------------------------------------

/// The in-memory navigation menu (a forest of [`MenuEntry`]s).
///
/// Structural misses (an id not present anywhere in the tree) are no-ops
/// reported through the return value, never errors: the remote store may
/// have cascaded a removal the local tree already applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTree {
    roots: Vec<MenuEntry>,
}

impl MenuTree {
    #[must_use]
    pub fn from_roots(roots: Vec<MenuEntry>) -> Self {
        Self { roots }
    }

    #[must_use]
    pub fn roots(&self) -> &[MenuEntry] {
        &self.roots
    }

    /// Depth-first search for an entry by id.
    #[must_use]
    pub fn find(&self, id: EntryId) -> Option<&MenuEntry> {
        find_in(&self.roots, id)
    }

    /// Appends `entry` at the end of the sibling list under `parent`
    /// (root level for `None`), assigning `position` = prior sibling count.
    ///
    /// Returns `false` without mutating when the parent id is not in the
    /// tree.
    pub fn insert_child(&mut self, parent: Option<EntryId>, mut entry: MenuEntry) -> bool {
        let Some(siblings) = self.siblings_mut(parent) else {
            return false;
        };
        entry.parent_id = parent;
        entry.position = u32::try_from(siblings.len()).unwrap_or(u32::MAX);
        siblings.push(entry);
        true
    }

    /// Detaches the entry matching `id` together with all of its
    /// descendants, renumbering the remaining siblings contiguously.
    ///
    /// Returns the detached subtree, or `None` when the id is absent
    /// (already removed as collateral of an earlier removal, for instance).
    pub fn remove_with_descendants(&mut self, id: EntryId) -> Option<MenuEntry> {
        remove_in(&mut self.roots, id)
    }

    /// Deep-merges `patch` into the entry matching `id`, wherever it occurs.
    ///
    /// Returns whether a matching entry was found.
    pub fn patch(&mut self, id: EntryId, patch: &EntryPatch) -> bool {
        match find_in_mut(&mut self.roots, id) {
            Some(entry) => {
                entry.apply(patch);
                true
            }
            None => false,
        }
    }

    /// The sibling list under `parent` (`None` = root level).
    ///
    /// `None` when the parent id itself is not in the tree.
    #[must_use]
    pub fn siblings(&self, parent: Option<EntryId>) -> Option<&[MenuEntry]> {
        match parent {
            None => Some(&self.roots),
            Some(id) => self.find(id).map(|e| e.children.as_slice()),
        }
    }

    /// Mutable access to the sibling list under `parent`.
    ///
    /// This is the reorder engine's entry point; all other callers should
    /// prefer the targeted primitives above.
    pub fn siblings_mut(&mut self, parent: Option<EntryId>) -> Option<&mut Vec<MenuEntry>> {
        match parent {
            None => Some(&mut self.roots),
            Some(id) => find_in_mut(&mut self.roots, id).map(|e| &mut e.children),
        }
    }

    /// Catalog ids referenced by live entries, any depth.
    #[must_use]
    pub fn live_catalog_ids(&self) -> Vec<CatalogId> {
        let mut out = Vec::new();
        for root in &self.roots {
            collect_catalog_ids(root, &mut out);
        }
        out
    }

    /// Total entry count, all depths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.iter().map(|e| e.entry_ids().len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn find_in(entries: &[MenuEntry], id: EntryId) -> Option<&MenuEntry> {
    for entry in entries {
        if entry.id == id {
            return Some(entry);
        }
        if let Some(found) = find_in(&entry.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut(entries: &mut [MenuEntry], id: EntryId) -> Option<&mut MenuEntry> {
    for entry in entries {
        if entry.id == id {
            return Some(entry);
        }
        if let Some(found) = find_in_mut(&mut entry.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove_in(entries: &mut Vec<MenuEntry>, id: EntryId) -> Option<MenuEntry> {
    if let Some(index) = entries.iter().position(|e| e.id == id) {
        let removed = entries.remove(index);
        for (position, sibling) in entries.iter_mut().enumerate() {
            sibling.position = u32::try_from(position).unwrap_or(u32::MAX);
        }
        return Some(removed);
    }
    for entry in entries {
        if let Some(removed) = remove_in(&mut entry.children, id) {
            return Some(removed);
        }
    }
    None
}
