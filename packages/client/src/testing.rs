//! Call-recording in-memory store shared by the session and commit tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use meganav_core::{
    EntryPatch, MenuEntryWire, MenuStore, ReorderItem, Snapshot, SnapshotWire, StoreError,
};

/// One recorded store call, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Snapshot,
    Add {
        catalog_node_id: u64,
        parent_id: Option<u64>,
    },
    Remove {
        id: u64,
    },
    Update {
        id: u64,
        patch: EntryPatch,
    },
    Reorder {
        items: Vec<ReorderItem>,
    },
}

/// In-memory [`MenuStore`] with per-operation failure injection.
///
/// The snapshot it serves is fixed; mutations are recorded, not applied, so
/// tests can assert exactly which calls went out.
pub(crate) struct MockStore {
    snapshot: Mutex<Snapshot>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    fail_snapshot: AtomicBool,
    fail_add: AtomicBool,
    fail_remove: AtomicBool,
    fail_update: AtomicBool,
    fail_reorder: AtomicBool,
}

impl MockStore {
    pub(crate) fn empty() -> Self {
        Self::with_snapshot(Snapshot::default())
    }

    pub(crate) fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1000),
            fail_snapshot: AtomicBool::new(false),
            fail_add: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_reorder: AtomicBool::new(false),
        }
    }

    /// Builds a store serving the snapshot decoded from a JSON payload.
    pub(crate) fn serving(payload: serde_json::Value) -> Self {
        Self::with_snapshot(decode(payload))
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("mock poisoned").clone()
    }

    pub(crate) fn set_next_id(&self, id: u64) {
        self.next_id.store(id, Ordering::SeqCst);
    }

    pub(crate) fn fail_snapshots(&self) {
        self.fail_snapshot.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_adds(&self) {
        self.fail_add.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_removes(&self) {
        self.fail_remove.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_updates(&self) {
        self.fail_update.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_reorders(&self) {
        self.fail_reorder.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("mock poisoned").push(call);
    }

    fn injected(&self, flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Status {
                code: 500,
                body: format!("injected {op} failure"),
            })
        } else {
            Ok(())
        }
    }
}

/// Decodes a `SnapshotWire` JSON payload, panicking on malformed test data.
pub(crate) fn decode(payload: serde_json::Value) -> Snapshot {
    let wire: SnapshotWire = serde_json::from_value(payload).expect("test payload shape");
    wire.decode().expect("test payload validity")
}

#[async_trait]
impl MenuStore for MockStore {
    async fn fetch_snapshot(&self) -> Result<Snapshot, StoreError> {
        self.record(Call::Snapshot);
        self.injected(&self.fail_snapshot, "snapshot")?;
        Ok(self.snapshot.lock().expect("mock poisoned").clone())
    }

    async fn add_entry(
        &self,
        catalog_node_id: u64,
        parent_id: Option<u64>,
    ) -> Result<MenuEntryWire, StoreError> {
        self.record(Call::Add {
            catalog_node_id,
            parent_id,
        });
        self.injected(&self.fail_add, "add")?;
        Ok(MenuEntryWire {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            catalog_node_id,
            parent_id,
            position: 0,
            active: true,
            show_children: false,
            children: Vec::new(),
        })
    }

    async fn remove_entry(&self, id: u64) -> Result<(), StoreError> {
        self.record(Call::Remove { id });
        self.injected(&self.fail_remove, "remove")
    }

    async fn update_entry(&self, id: u64, patch: &EntryPatch) -> Result<(), StoreError> {
        self.record(Call::Update {
            id,
            patch: patch.clone(),
        });
        self.injected(&self.fail_update, "update")
    }

    async fn reorder(&self, items: &[ReorderItem]) -> Result<(), StoreError> {
        self.record(Call::Reorder {
            items: items.to_vec(),
        });
        self.injected(&self.fail_reorder, "reorder")
    }
}
