//! Integration tests for the HTTP store against a local axum backend.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use meganav_client::{HttpConfig, HttpMenuStore};
use meganav_core::{CatalogId, EntryPatch, MenuStore, ReorderItem, StoreError};

/// One request the backend saw: method, path, and decoded JSON body (null
/// for body-less requests).
type Seen = (String, String, serde_json::Value);

#[derive(Clone, Default)]
struct Backend {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Backend {
    fn record(&self, method: &str, path: String, body: serde_json::Value) {
        self.seen
            .lock()
            .expect("backend poisoned")
            .push((method.to_string(), path, body));
    }

    fn requests(&self) -> Vec<Seen> {
        self.seen.lock().expect("backend poisoned").clone()
    }
}

fn snapshot_payload() -> serde_json::Value {
    serde_json::json!({
        "collectionsTree": [
            {
                "id": 1, "name": "Shoes", "slug": "shoes", "kind": "category",
                "children": [
                    { "id": 2, "name": "Boots", "slug": "boots", "kind": "category" }
                ]
            },
            { "id": 17, "name": "Sale", "slug": "sale", "kind": "featured" }
        ],
        "megaMenu": [
            { "id": 40, "catalogNodeId": 1, "position": 0, "active": true }
        ]
    })
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route(
            "/menu/snapshot",
            get(|State(backend): State<Backend>| async move {
                backend.record("GET", "/menu/snapshot".to_string(), serde_json::Value::Null);
                Json(snapshot_payload())
            }),
        )
        .route(
            "/menu/entries",
            post(
                |State(backend): State<Backend>, Json(body): Json<serde_json::Value>| async move {
                    backend.record("POST", "/menu/entries".to_string(), body.clone());
                    Json(serde_json::json!({
                        "id": 900,
                        "catalogNodeId": body["catalogNodeId"],
                        "parentId": body["parentId"],
                        "position": 0,
                        "active": true
                    }))
                },
            ),
        )
        .route(
            "/menu/entries/{id}",
            axum::routing::delete(
                |State(backend): State<Backend>, Path(id): Path<u64>| async move {
                    if id == 999 {
                        return (StatusCode::NOT_FOUND, "no such entry").into_response();
                    }
                    backend.record(
                        "DELETE",
                        format!("/menu/entries/{id}"),
                        serde_json::Value::Null,
                    );
                    StatusCode::NO_CONTENT.into_response()
                },
            )
            .patch(
                |State(backend): State<Backend>,
                 Path(id): Path<u64>,
                 Json(body): Json<serde_json::Value>| async move {
                    backend.record("PATCH", format!("/menu/entries/{id}"), body);
                    StatusCode::NO_CONTENT
                },
            ),
        )
        .route(
            "/menu/entries/positions",
            put(
                |State(backend): State<Backend>, Json(body): Json<serde_json::Value>| async move {
                    backend.record("PUT", "/menu/entries/positions".to_string(), body);
                    StatusCode::NO_CONTENT
                },
            ),
        )
        .with_state(backend)
}

async fn serve(app: Router) -> Result<SocketAddr> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    Ok(addr)
}

async fn store_against(backend: Backend) -> Result<HttpMenuStore> {
    let addr = serve(router(backend)).await?;
    Ok(HttpMenuStore::new(HttpConfig::new(format!("http://{addr}")))?)
}

#[tokio::test]
async fn snapshot_fetch_decodes_both_trees() -> Result<()> {
    let backend = Backend::default();
    let store = store_against(backend).await?;
    let snapshot = store.fetch_snapshot().await?;
    assert_eq!(snapshot.catalog.len(), 3);
    assert_eq!(snapshot.menu.len(), 1);
    assert!(snapshot.catalog.find(CatalogId(1)).unwrap().in_menu);
    assert!(!snapshot.catalog.find(CatalogId(17)).unwrap().in_menu);
    Ok(())
}

#[tokio::test]
async fn add_sends_explicit_null_parent_and_decodes_created_entry() -> Result<()> {
    let backend = Backend::default();
    let store = store_against(backend.clone()).await?;
    let created = store.add_entry(17, None).await?;
    assert_eq!(created.id, 900);
    assert_eq!(created.catalog_node_id, 17);
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].2,
        serde_json::json!({ "catalogNodeId": 17, "parentId": null })
    );
    Ok(())
}

#[tokio::test]
async fn update_sends_only_present_patch_fields() -> Result<()> {
    let backend = Backend::default();
    let store = store_against(backend.clone()).await?;
    store.update_entry(40, &EntryPatch::active(false)).await?;
    let requests = backend.requests();
    assert_eq!(requests[0].1, "/menu/entries/40");
    assert_eq!(requests[0].2, serde_json::json!({ "active": false }));
    Ok(())
}

#[tokio::test]
async fn remove_and_reorder_hit_their_endpoints() -> Result<()> {
    let backend = Backend::default();
    let store = store_against(backend.clone()).await?;
    store.remove_entry(40).await?;
    store
        .reorder(&[
            ReorderItem { id: 41, position: 0 },
            ReorderItem { id: 40, position: 1 },
        ])
        .await?;
    let requests = backend.requests();
    assert_eq!(requests[0].0, "DELETE");
    assert_eq!(requests[0].1, "/menu/entries/40");
    assert_eq!(requests[1].0, "PUT");
    assert_eq!(
        requests[1].2,
        serde_json::json!([
            { "id": 41, "position": 0 },
            { "id": 40, "position": 1 }
        ])
    );
    Ok(())
}

#[tokio::test]
async fn non_success_status_surfaces_code_and_body() -> Result<()> {
    let backend = Backend::default();
    let store = store_against(backend).await?;
    let error = store.remove_entry(999).await.unwrap_err();
    assert_eq!(
        error,
        StoreError::Status {
            code: 404,
            body: "no such entry".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn malformed_snapshot_body_is_a_decode_error() -> Result<()> {
    let app = Router::new().route(
        "/menu/snapshot",
        get(|| async { Json(serde_json::json!({ "surprise": true })) }),
    );
    let addr = serve(app).await?;
    let store = HttpMenuStore::new(HttpConfig::new(format!("http://{addr}")))?;
    let error = store.fetch_snapshot().await.unwrap_err();
    assert!(matches!(error, StoreError::Decode(_)));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() -> Result<()> {
    // Bind then drop the listener so the port refuses connections.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let store = HttpMenuStore::new(HttpConfig::new(format!("http://{addr}")))?;
    let error = store.fetch_snapshot().await.unwrap_err();
    assert!(matches!(error, StoreError::Transport(_)));
    Ok(())
}
