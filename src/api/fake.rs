use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{ApiError, RestBackend};

/// A recorded call against [`FakeBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory REST host with call recording, one-shot failure injection and
/// artificial latency.
pub struct FakeBackend {
    pub collections: Mutex<HashMap<String, Vec<Value>>>,
    pub calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<(&'static str, String)>>,
    next_id: AtomicU64,
    pub read_delay: Duration,
    pub write_delay: Duration,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(100),
            read_delay: Duration::from_millis(0),
            write_delay: Duration::from_millis(0),
        }
    }
}

impl FakeBackend {
    pub fn with_delays(read_delay: Duration, write_delay: Duration) -> Self {
        Self {
            read_delay,
            write_delay,
            ..Self::default()
        }
    }

    pub async fn seed(&self, collection: &str, rows: Vec<Value>) {
        self.collections
            .lock()
            .await
            .insert(collection.to_string(), rows);
    }

    /// The next `method` call on exactly `path` fails with HTTP 500.
    pub async fn fail_next(&self, method: &'static str, path: &str) {
        self.failures.lock().await.push((method, path.to_string()));
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, method: &'static str, path: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub async fn row(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .lock()
            .await
            .get(collection)
            .and_then(|rows| rows.iter().find(|r| r["id"] == id).cloned())
    }

    async fn record(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<(), ApiError> {
        self.calls.lock().await.push(Call {
            method,
            path: path.to_string(),
            body,
        });
        let delay = if method == "GET" {
            self.read_delay
        } else {
            self.write_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut failures = self.failures.lock().await;
        if let Some(pos) = failures.iter().position(|(m, p)| *m == method && p == path) {
            failures.remove(pos);
            return Err(ApiError::Status {
                status: 500,
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

fn split(path: &str) -> (&str, Option<&str>) {
    let path = path.trim_matches('/');
    match path.split_once('/') {
        Some((collection, id)) => (collection, Some(id)),
        None => (path, None),
    }
}

fn not_found(path: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        path: path.to_string(),
    }
}

#[async_trait]
impl RestBackend for FakeBackend {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    /// Reads the collection as it stands when the request arrives, before
    /// any read delay.
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let (collection, id) = split(path);
        let rows = self
            .collections
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();
        self.record("GET", path, None).await?;
        match id {
            None => Ok(Value::Array(rows)),
            Some(id) => rows
                .into_iter()
                .find(|r| r["id"] == id)
                .ok_or_else(|| not_found(path)),
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.record("POST", path, Some(body.clone())).await?;
        let (collection, _) = split(path);
        let mut row = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        row.insert("id".to_string(), Value::String(id.to_string()));
        let row = Value::Object(row);
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.record("PUT", path, Some(body.clone())).await?;
        let (collection, id) = split(path);
        let id = id.ok_or_else(|| not_found(path))?;
        let mut collections = self.collections.lock().await;
        let row = collections
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id))
            .ok_or_else(|| not_found(path))?;
        if let (Value::Object(target), Value::Object(patch)) = (&mut *row, body) {
            target.extend(patch);
        }
        Ok(row.clone())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.record("DELETE", path, None).await?;
        let (collection, id) = split(path);
        let id = id.ok_or_else(|| not_found(path))?;
        let mut collections = self.collections.lock().await;
        let rows = collections.get_mut(collection).ok_or_else(|| not_found(path))?;
        let before = rows.len();
        rows.retain(|r| r["id"] != id);
        if rows.len() == before {
            return Err(not_found(path));
        }
        Ok(())
    }
}
