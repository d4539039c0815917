//! The remote store contract and its error taxonomy.
//!
//! These five operations are everything the engine needs from the backend.
//! Authentication, transport framing, and HTTP-level retries belong to the
//! implementing layer.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::menu::EntryPatch;
use crate::snapshot::{MenuEntryWire, Snapshot};

/// Remote store failure, transport-independent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The request never produced a response (connect, timeout, I/O).
    #[error("transport: {0}")]
    Transport(String),
    /// The store answered with a non-success status.
    #[error("status {code}: {body}")]
    Status { code: u16, body: String },
    /// The response body did not decode into the expected shape.
    #[error("decode: {0}")]
    Decode(String),
}

/// Body of an add call. `parent_id` serializes explicitly, `null` included,
/// so the store never has to guess between "no parent" and "unspecified".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    pub catalog_node_id: u64,
    pub parent_id: Option<u64>,
}

/// One item of a reorder call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReorderItem {
    pub id: u64,
    pub position: u32,
}

/// The remote menu store.
///
/// Only persisted ids cross this boundary; staged ids are resolved by the
/// commit engine before any call is issued.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Fetches the authoritative snapshot of both trees.
    async fn fetch_snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Creates a menu entry projecting `catalog_node_id` under `parent_id`
    /// (top level for `None`). Returns the created entry with its
    /// server-assigned id.
    async fn add_entry(
        &self,
        catalog_node_id: u64,
        parent_id: Option<u64>,
    ) -> Result<MenuEntryWire, StoreError>;

    /// Removes a menu entry; the store cascades to its descendants.
    async fn remove_entry(&self, id: u64) -> Result<(), StoreError>;

    /// Applies a partial field update to a menu entry.
    async fn update_entry(&self, id: u64, patch: &EntryPatch) -> Result<(), StoreError>;

    /// Replaces the positions of a sibling list in one call.
    async fn reorder(&self, items: &[ReorderItem]) -> Result<(), StoreError>;
}
