//! HTTP implementation of [`MenuStore`] over the admin API.
//!
//! Endpoint map:
//!
//! | operation      | request                              |
//! |----------------|--------------------------------------|
//! | fetch_snapshot | `GET    /menu/snapshot`              |
//! | add_entry      | `POST   /menu/entries`               |
//! | remove_entry   | `DELETE /menu/entries/{id}`          |
//! | update_entry   | `PATCH  /menu/entries/{id}`          |
//! | reorder        | `PUT    /menu/entries/positions`     |
//!
//! Transport failures, non-success statuses, and undecodable bodies map to
//! the three [`StoreError`] variants; retries belong to the caller.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use meganav_core::{
    AddEntryRequest, EntryPatch, MenuEntryWire, MenuStore, ReorderItem, Snapshot, SnapshotWire,
    StoreError,
};

use crate::config::HttpConfig;

/// [`MenuStore`] backed by a reqwest client.
pub struct HttpMenuStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMenuStore {
    /// Builds the store and its underlying client.
    ///
    /// # Errors
    ///
    /// [`StoreError::Transport`] when the TLS backend fails to initialize.
    pub fn new(config: HttpConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            code: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|error| StoreError::Decode(error.to_string()))
    }
}

fn transport(error: reqwest::Error) -> StoreError {
    StoreError::Transport(error.to_string())
}

#[async_trait]
impl MenuStore for HttpMenuStore {
    async fn fetch_snapshot(&self) -> Result<Snapshot, StoreError> {
        debug!("GET /menu/snapshot");
        let wire: SnapshotWire = self
            .send_json(self.client.get(self.url("/menu/snapshot")))
            .await?;
        wire.decode()
            .map_err(|error| StoreError::Decode(error.to_string()))
    }

    async fn add_entry(
        &self,
        catalog_node_id: u64,
        parent_id: Option<u64>,
    ) -> Result<MenuEntryWire, StoreError> {
        debug!(catalog_node_id, ?parent_id, "POST /menu/entries");
        let body = AddEntryRequest {
            catalog_node_id,
            parent_id,
        };
        self.send_json(self.client.post(self.url("/menu/entries")).json(&body))
            .await
    }

    async fn remove_entry(&self, id: u64) -> Result<(), StoreError> {
        debug!(id, "DELETE /menu/entries/{{id}}");
        self.send(self.client.delete(self.url(&format!("/menu/entries/{id}"))))
            .await?;
        Ok(())
    }

    async fn update_entry(&self, id: u64, patch: &EntryPatch) -> Result<(), StoreError> {
        debug!(id, ?patch, "PATCH /menu/entries/{{id}}");
        self.send(
            self.client
                .patch(self.url(&format!("/menu/entries/{id}")))
                .json(patch),
        )
        .await?;
        Ok(())
    }

    async fn reorder(&self, items: &[ReorderItem]) -> Result<(), StoreError> {
        debug!(count = items.len(), "PUT /menu/entries/positions");
        self.send(
            self.client
                .put(self.url("/menu/entries/positions"))
                .json(&items),
        )
        .await?;
        Ok(())
    }
}
