//! Catalog tree: the collection hierarchy the menu projects from.
//!
//! Nodes are created and destroyed by catalog management, which is outside
//! this crate. The only mutation owned here is the `in_menu` membership
//! flag, kept consistent with the menu tree by [`CatalogTree::mark_included`]
//! (the synchronizer contract: one call per menu add, one call per removed
//! entry and each of its removed descendants).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::CatalogId;

/// Discriminant for catalog node kinds.
///
/// Kebab-case on the wire (`"category-parent"`, `"brand-parent"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    Category,
    Brand,
    Featured,
    Custom,
    CategoryParent,
    BrandParent,
}

/// A node in the collection hierarchy.
///
/// `depth` and `in_menu` are derived: depth from nesting at snapshot decode
/// time, `in_menu` from the set of live menu entries.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogNode {
    pub id: CatalogId,
    pub name: String,
    pub slug: String,
    /// Parent catalog node, `None` for roots.
    pub parent_id: Option<CatalogId>,
    pub kind: CatalogKind,
    /// 0 for roots, parent's depth + 1 otherwise.
    pub depth: u32,
    /// Whether a live menu entry references this node. Mutated only by
    /// [`CatalogTree::mark_included`].
    pub in_menu: bool,
    /// Insertion order is display order.
    pub children: Vec<CatalogNode>,
}

impl CatalogNode {
    /// Creates a root-level node with no children and no menu membership.
    #[must_use]
    pub fn new(id: CatalogId, name: impl Into<String>, slug: impl Into<String>, kind: CatalogKind) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            parent_id: None,
            kind,
            depth: 0,
            in_menu: false,
            children: Vec::new(),
        }
    }
}

/// The in-memory collection hierarchy (a forest of [`CatalogNode`]s).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTree {
    roots: Vec<CatalogNode>,
}

impl CatalogTree {
    /// Builds a tree from root nodes, recomputing `depth` and `parent_id`
    /// from the nesting so the forest invariant holds regardless of what the
    /// caller filled in.
    #[must_use]
    pub fn from_roots(mut roots: Vec<CatalogNode>) -> Self {
        for root in &mut roots {
            fix_links(root, None, 0);
        }
        Self { roots }
    }

    #[must_use]
    pub fn roots(&self) -> &[CatalogNode] {
        &self.roots
    }

    /// Depth-first search for a node by id.
    #[must_use]
    pub fn find(&self, id: CatalogId) -> Option<&CatalogNode> {
        find_in(&self.roots, id)
    }

    /// Flips the `in_menu` flag on the first (and only) node matching `id`.
    ///
    /// Single depth-first walk; idempotent. Returns whether the node was
    /// found. The synchronizer contract from the session layer: called with
    /// `true` on add, `false` for every catalog node referenced by a removed
    /// entry and its removed descendants.
    pub fn mark_included(&mut self, id: CatalogId, included: bool) -> bool {
        mark_in(&mut self.roots, id, included)
    }

    /// Ids of all nodes currently flagged as in the menu.
    #[must_use]
    pub fn included_ids(&self) -> BTreeSet<CatalogId> {
        let mut out = BTreeSet::new();
        collect_included(&self.roots, &mut out);
        out
    }

    /// Total node count, all depths.
    #[must_use]
    pub fn len(&self) -> usize {
        count(&self.roots)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn fix_links(node: &mut CatalogNode, parent: Option<CatalogId>, depth: u32) {
    node.parent_id = parent;
    node.depth = depth;
    for child in &mut node.children {
        fix_links(child, Some(node.id), depth + 1);
    }
}

fn find_in(nodes: &[CatalogNode], id: CatalogId) -> Option<&CatalogNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn mark_in(nodes: &mut [CatalogNode], id: CatalogId, included: bool) -> bool {
    for node in nodes {
        if node.id == id {
            node.in_menu = included;
            return true;
        }
        if mark_in(&mut node.children, id, included) {
            return true;
        }
    }
    false
}

fn collect_included(nodes: &[CatalogNode], out: &mut BTreeSet<CatalogId>) {
    for node in nodes {
        if node.in_menu {
            out.insert(node.id);
        }
        collect_included(&node.children, out);
    }
}

fn count(nodes: &[CatalogNode]) -> usize {
    nodes.iter().map(|n| 1 + count(&n.children)).sum()
}
