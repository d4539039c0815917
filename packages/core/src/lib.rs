//! Mega-menu core — catalog/menu trees, pending change set, reorder engine,
//! and the remote store contract.

pub mod catalog;
pub mod id;
pub mod menu;
pub mod pending;
pub mod reorder;
pub mod snapshot;
pub mod store;

pub use catalog::{CatalogKind, CatalogNode, CatalogTree};
pub use id::{CatalogId, EntryId, StagedId, StagedIdGen};
pub use menu::{EntryPatch, MenuEntry, MenuTree};
pub use pending::{PendingAdd, PendingChanges};
pub use reorder::{PositionUpdate, ReorderOutcome};
pub use snapshot::{CatalogNodeWire, MenuEntryWire, Snapshot, SnapshotError, SnapshotWire};
pub use store::{AddEntryRequest, MenuStore, ReorderItem, StoreError};
