//! Position renumbering for sibling menu entries.
//!
//! Two entry points: adjacent swap (move up / move down) and arbitrary
//! reposition (drag to an index). After either, every entry in the list is
//! renumbered `position = index`, not just the moved ones, because callers
//! may be viewing a parent-scoped slice whose stored positions drifted.
//! Bounds violations (first entry up, last entry down, unknown id) are
//! detected before any mutation and reported as `None`.

use crate::id::EntryId;
use crate::menu::MenuEntry;

/// One `(id, position)` pair of a renumbered sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: EntryId,
    pub position: u32,
}

/// Result of a reorder: the full post-move order (sent as one reorder call
/// in direct mode) and the subset whose position actually changed (merged
/// into the pending updates in staged mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub order: Vec<PositionUpdate>,
    pub changed: Vec<PositionUpdate>,
}

/// Swaps the entry one slot toward the front. No-op (`None`) for the first
/// entry or an unknown id.
pub fn move_up(siblings: &mut [MenuEntry], id: EntryId) -> Option<ReorderOutcome> {
    let index = siblings.iter().position(|e| e.id == id)?;
    if index == 0 {
        return None;
    }
    siblings.swap(index, index - 1);
    Some(renumber(siblings))
}

/// Swaps the entry one slot toward the back. No-op (`None`) for the last
/// entry or an unknown id.
pub fn move_down(siblings: &mut [MenuEntry], id: EntryId) -> Option<ReorderOutcome> {
    let index = siblings.iter().position(|e| e.id == id)?;
    if index + 1 >= siblings.len() {
        return None;
    }
    siblings.swap(index, index + 1);
    Some(renumber(siblings))
}

/// Moves the entry to an arbitrary index (clamped to the list length).
/// No-op (`None`) for an unknown id or when the entry is already there.
pub fn move_to(siblings: &mut Vec<MenuEntry>, id: EntryId, index: usize) -> Option<ReorderOutcome> {
    let from = siblings.iter().position(|e| e.id == id)?;
    let to = index.min(siblings.len() - 1);
    if from == to {
        return None;
    }
    let moved = siblings.remove(from);
    siblings.insert(to, moved);
    Some(renumber(siblings))
}

/// Renumbers the whole list to `position = index`, collecting the full
/// order and the changed subset.
fn renumber(siblings: &mut [MenuEntry]) -> ReorderOutcome {
    let mut order = Vec::with_capacity(siblings.len());
    let mut changed = Vec::new();
    for (index, entry) in siblings.iter_mut().enumerate() {
        let position = u32::try_from(index).unwrap_or(u32::MAX);
        let update = PositionUpdate {
            id: entry.id,
            position,
        };
        if entry.position != position {
            entry.position = position;
            changed.push(update);
        }
        order.push(update);
    }
    ReorderOutcome { order, changed }
}
