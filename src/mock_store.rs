//! In-process stand-in for the hosted REST store.
//!
//! Serves the same verbs as the hosted mock API over in-memory collections. Used by
//! the `mock_store` binary for local development and by the integration tests.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    net::SocketAddr,
    sync::Arc,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::{Map, Value, json};
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};

use crate::store::Collection;

#[derive(Default)]
struct Inner {
    collections: HashMap<Collection, BTreeMap<u64, Value>>,
    next_id: u64,
    failing: HashSet<(Collection, String)>,
}

#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/{collection}", get(list_records).post(create_record))
            .route(
                "/{collection}/{id}",
                get(get_record).put(update_record).delete(delete_record),
            )
            .with_state(self.clone())
    }

    /// Binds to `addr` and serves in the background. Returns the bound address.
    pub async fn spawn(&self, addr: SocketAddr) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        let app = self.router();
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "mock store stopped");
            }
        });
        Ok((local, handle))
    }

    /// Makes PUT and DELETE on the given record answer 500.
    pub async fn inject_failure(&self, collection: Collection, id: &str) {
        let mut inner = self.inner.lock().await;
        inner.failing.insert((collection, id.to_string()));
    }

    /// Inserts a record directly, bypassing HTTP. Returns the assigned id.
    pub async fn insert(&self, collection: Collection, record: Value) -> String {
        let mut inner = self.inner.lock().await;
        inner.insert(collection, record)["id"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    pub async fn records(&self, collection: Collection) -> Vec<Value> {
        let inner = self.inner.lock().await;
        inner
            .collections
            .get(&collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Inner {
    fn insert(&mut self, collection: Collection, record: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        let mut fields = match record {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.insert("id".into(), Value::String(id.to_string()));
        fields
            .entry("createdAt")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        let record = Value::Object(fields);
        self.collections
            .entry(collection)
            .or_default()
            .insert(id, record.clone());
        record
    }

    fn is_failing(&self, collection: Collection, id: &str) -> bool {
        self.failing.contains(&(collection, id.to_string()))
    }
}

enum MockError {
    UnknownCollection,
    NotFound,
    Injected,
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        match self {
            MockError::UnknownCollection | MockError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!("Not found"))).into_response()
            }
            MockError::Injected => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("Injected failure")))
                    .into_response()
            }
        }
    }
}

fn collection_of(path: &str) -> Result<Collection, MockError> {
    Collection::from_path(path).ok_or(MockError::UnknownCollection)
}

fn parse_id(id: &str) -> Result<u64, MockError> {
    id.parse().map_err(|_| MockError::NotFound)
}

async fn list_records(
    State(store): State<MockStore>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<Value>>, MockError> {
    let collection = collection_of(&collection)?;
    let inner = store.inner.lock().await;
    match inner.collections.get(&collection) {
        Some(records) if !records.is_empty() => Ok(Json(records.values().cloned().collect())),
        // the hosted store reports an empty collection as missing
        _ => Err(MockError::NotFound),
    }
}

async fn get_record(
    State(store): State<MockStore>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, MockError> {
    let collection = collection_of(&collection)?;
    let key = parse_id(&id)?;
    let inner = store.inner.lock().await;
    inner
        .collections
        .get(&collection)
        .and_then(|records| records.get(&key))
        .cloned()
        .map(Json)
        .ok_or(MockError::NotFound)
}

async fn create_record(
    State(store): State<MockStore>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), MockError> {
    let collection = collection_of(&collection)?;
    let mut inner = store.inner.lock().await;
    let record = inner.insert(collection, body);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record(
    State(store): State<MockStore>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    let collection = collection_of(&collection)?;
    let key = parse_id(&id)?;
    let mut inner = store.inner.lock().await;
    if inner.is_failing(collection, &id) {
        return Err(MockError::Injected);
    }
    let record = inner
        .collections
        .get_mut(&collection)
        .and_then(|records| records.get_mut(&key))
        .ok_or(MockError::NotFound)?;

    if let (Value::Object(existing), Value::Object(changes)) = (&mut *record, body) {
        for (field, value) in changes {
            if field != "id" {
                existing.insert(field, value);
            }
        }
    }
    Ok(Json(record.clone()))
}

async fn delete_record(
    State(store): State<MockStore>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, MockError> {
    let collection = collection_of(&collection)?;
    let key = parse_id(&id)?;
    let mut inner = store.inner.lock().await;
    if inner.is_failing(collection, &id) {
        return Err(MockError::Injected);
    }
    inner
        .collections
        .get_mut(&collection)
        .and_then(|records| records.remove(&key))
        .map(Json)
        .ok_or(MockError::NotFound)
}
