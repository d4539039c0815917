//! Identifier types for catalog nodes and menu entries.
//!
//! Menu entries created inside a staged editing session do not have a
//! server-assigned id yet. Instead of the sign-punned convention (negative
//! integer = unsaved row), [`EntryId`] is a tagged union: a staged entry
//! carries a [`StagedId`] minted from a session-local counter and is
//! resolved to [`EntryId::Persisted`] only after its add call succeeds.
//! Only persisted ids ever appear on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a catalog node (collection, brand, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CatalogId(pub u64);

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "catalog:{}", self.0)
    }
}

/// Session-local token identifying a menu entry that has not been persisted.
///
/// Minted by [`StagedIdGen`]; unique within one editing session. Never sent
/// to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StagedId(pub u64);

impl fmt::Display for StagedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "staged:{}", self.0)
    }
}

/// Identity of a menu entry.
///
/// `Persisted` entries exist on the remote store; `Staged` entries exist
/// only in the local tree of an open editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryId {
    /// Server-assigned id of a persisted menu entry.
    Persisted(u64),
    /// Placeholder id of a locally staged, not-yet-committed entry.
    Staged(StagedId),
}

impl EntryId {
    /// Returns the server-assigned id, or `None` for staged entries.
    #[must_use]
    pub fn persisted(self) -> Option<u64> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Staged(_) => None,
        }
    }

    /// Whether this id refers to a locally staged entry.
    #[must_use]
    pub fn is_staged(self) -> bool {
        matches!(self, Self::Staged(_))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted(id) => write!(f, "entry:{id}"),
            Self::Staged(local) => local.fmt(f),
        }
    }
}

impl From<StagedId> for EntryId {
    fn from(local: StagedId) -> Self {
        Self::Staged(local)
    }
}

/// Monotonic generator for [`StagedId`]s, one per editing session.
#[derive(Debug, Default)]
pub struct StagedIdGen {
    next: u64,
}

impl StagedIdGen {
    /// Creates a generator starting at token 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints the next unique staged id.
    pub fn mint(&mut self) -> StagedId {
        self.next += 1;
        StagedId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_ids_are_unique_and_monotonic() {
        let mut ids = StagedIdGen::new();
        let a = ids.mint();
        let b = ids.mint();
        let c = ids.mint();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(a < b && b < c);
    }

    #[test]
    fn persisted_accessor() {
        assert_eq!(EntryId::Persisted(42).persisted(), Some(42));
        assert_eq!(EntryId::Staged(StagedId(1)).persisted(), None);
    }

    #[test]
    fn is_staged_discriminates() {
        assert!(EntryId::Staged(StagedId(7)).is_staged());
        assert!(!EntryId::Persisted(7).is_staged());
    }

    #[test]
    fn display_formats() {
        assert_eq!(EntryId::Persisted(3).to_string(), "entry:3");
        assert_eq!(EntryId::Staged(StagedId(3)).to_string(), "staged:3");
        assert_eq!(CatalogId(9).to_string(), "catalog:9");
    }

    #[test]
    fn catalog_id_serde_transparent() {
        let json = serde_json::to_string(&CatalogId(17)).unwrap();
        assert_eq!(json, "17");
        let back: CatalogId = serde_json::from_str("17").unwrap();
        assert_eq!(back, CatalogId(17));
    }
}
