use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, RestBackend};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// A record type served by one REST collection and cached by a [`ResourceActor`].
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;
    type CreatePayload: Clone + Debug + Send + Sync + Serialize + 'static;
    type Patch: Debug + Send + Sync + Serialize + 'static;

    /// Collection path under the API base URL, e.g. `products`.
    const COLLECTION: &'static str;

    /// Whether `create` inserts a provisional entity into the cached list
    /// before the server answers.
    const OPTIMISTIC_CREATE: bool = false;

    fn id(&self) -> &Self::Id;

    /// Build the provisional entity shown while a create is in flight.
    fn from_create(id: Self::Id, payload: &Self::CreatePayload) -> Self;

    /// Placeholder id for the `seq`-th provisional entity.
    fn provisional_id(seq: u64) -> Self::Id;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey<Id> {
    List,
    Item(Id),
}

/// Point-in-time view of one cached query, mirroring what a view needs to
/// pick between loading, error and data rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot<V> {
    pub data: Option<V>,
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub error: Option<ApiError>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    List {
        respond_to: Response<Vec<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<T>,
    },
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Refetch {
        key: QueryKey<T::Id>,
    },
    Invalidate {
        key: QueryKey<T::Id>,
    },
    ListSnapshot {
        respond_to: oneshot::Sender<QuerySnapshot<Vec<T>>>,
    },
    ItemSnapshot {
        id: T::Id,
        respond_to: oneshot::Sender<QuerySnapshot<T>>,
    },
}

/// Results of spawned network calls, fed back into the owning actor.
enum Completion<T: Entity> {
    ListFetched(Result<Vec<T>, ApiError>),
    ItemFetched {
        id: T::Id,
        result: Result<T, ApiError>,
    },
    Created {
        provisional: Option<T::Id>,
        result: Result<T, ApiError>,
        respond_to: Response<T>,
    },
    Updated {
        id: T::Id,
        result: Result<T, ApiError>,
        respond_to: Response<T>,
    },
    Deleted {
        id: T::Id,
        result: Result<(), ApiError>,
        respond_to: Response<()>,
    },
}

// =============================================================================
// 3. THE QUERY CACHE
// =============================================================================

struct Query<V> {
    data: Option<V>,
    fetched_at: Option<DateTime<Utc>>,
    stale: bool,
    error: Option<ApiError>,
    in_flight: bool,
    invalidated_in_flight: bool,
    waiters: Vec<Response<V>>,
    /// Readers that arrived after the in-flight fetch was invalidated. The
    /// body that fetch returns predates their request.
    late_waiters: Vec<Response<V>>,
}

impl<V> Default for Query<V> {
    fn default() -> Self {
        Self {
            data: None,
            fetched_at: None,
            stale: false,
            error: None,
            in_flight: false,
            invalidated_in_flight: false,
            waiters: Vec::new(),
            late_waiters: Vec::new(),
        }
    }
}

impl<V: Clone> Query<V> {
    fn fresh(&self) -> Option<&V> {
        if self.stale {
            None
        } else {
            self.data.as_ref()
        }
    }

    fn invalidate(&mut self) {
        self.stale = true;
        if self.in_flight {
            self.invalidated_in_flight = true;
        }
    }

    /// Queues a reader behind the current fetch, or behind the next one when
    /// the current fetch was invalidated. Returns true if a fetch must start.
    fn wait(&mut self, respond_to: Response<V>) -> bool {
        if self.invalidated_in_flight {
            self.late_waiters.push(respond_to);
            false
        } else {
            self.waiters.push(respond_to);
            !self.in_flight
        }
    }

    /// Answers the readers of the landed fetch. Returns true when late
    /// readers are left waiting and a new fetch must start.
    fn settle(&mut self, result: Result<V, ApiError>) -> bool {
        self.in_flight = false;
        match result {
            Ok(data) => {
                for waiter in self.waiters.drain(..) {
                    let _ = waiter.send(Ok(data.clone()));
                }
                self.data = Some(data);
                self.fetched_at = Some(Utc::now());
                self.stale = std::mem::take(&mut self.invalidated_in_flight);
                self.error = None;
            }
            Err(e) => {
                for waiter in self.waiters.drain(..) {
                    let _ = waiter.send(Err(FrameworkError::Api(e.clone())));
                }
                self.invalidated_in_flight = false;
                self.error = Some(e);
            }
        }
        if self.late_waiters.is_empty() {
            return false;
        }
        self.waiters.append(&mut self.late_waiters);
        true
    }

    fn snapshot(&self) -> QuerySnapshot<V> {
        QuerySnapshot {
            data: self.data.clone(),
            is_loading: self.in_flight && self.data.is_none(),
            is_fetching: self.in_flight,
            is_stale: self.stale,
            error: self.error.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

/// Sole owner of the cache for one collection.
///
/// Network calls run in spawned tasks and report back over an internal
/// channel, so a slow write never holds up cached reads. Concurrent readers
/// of a key that is being fetched wait on that one fetch.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    completions: mpsc::UnboundedReceiver<Completion<T>>,
    completion_tx: mpsc::UnboundedSender<Completion<T>>,
    backend: Arc<dyn RestBackend>,
    list: Query<Vec<T>>,
    items: HashMap<T::Id, Query<T>>,
    provisional: Vec<T::Id>,
    next_provisional: u64,
    in_flight: usize,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(buffer_size: usize, backend: Arc<dyn RestBackend>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            completions,
            completion_tx,
            backend,
            list: Query::default(),
            items: HashMap::new(),
            provisional: Vec::new(),
            next_provisional: 1,
            in_flight: 0,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(collection = T::COLLECTION, backend = self.backend.backend_tag()))]
    pub async fn run(mut self) {
        info!("ResourceActor starting");
        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle_request(msg),
                    None => break,
                },
                Some(done) = self.completions.recv() => self.handle_completion(done),
            }
        }

        if self.in_flight > 0 {
            debug!(in_flight = self.in_flight, "Draining in-flight requests");
        }
        while self.in_flight > 0 {
            match self.completions.recv().await {
                Some(done) => self.handle_completion(done),
                None => break,
            }
        }
        info!("ResourceActor stopped");
    }

    fn handle_request(&mut self, msg: ResourceRequest<T>) {
        match msg {
            ResourceRequest::List { respond_to } => {
                if let Some(data) = self.list.fresh() {
                    debug!("List served from cache");
                    let _ = respond_to.send(Ok(data.clone()));
                } else if self.list.wait(respond_to) {
                    self.spawn_list_fetch();
                }
            }
            ResourceRequest::Get { id, respond_to } => {
                let query = self.items.entry(id.clone()).or_default();
                if let Some(item) = query.fresh() {
                    debug!(%id, "Item served from cache");
                    let _ = respond_to.send(Ok(item.clone()));
                } else if query.wait(respond_to) {
                    self.spawn_item_fetch(id);
                }
            }
            ResourceRequest::Create { payload, respond_to } => {
                let provisional = if T::OPTIMISTIC_CREATE {
                    self.insert_provisional(&payload)
                } else {
                    None
                };
                self.spawn_create(payload, provisional, respond_to);
            }
            ResourceRequest::Update { id, patch, respond_to } => {
                self.spawn_update(id, patch, respond_to);
            }
            ResourceRequest::Delete { id, respond_to } => {
                self.spawn_delete(id, respond_to);
            }
            ResourceRequest::Refetch { key } => match key {
                QueryKey::List => self.spawn_list_fetch(),
                QueryKey::Item(id) => {
                    self.items.entry(id.clone()).or_default();
                    self.spawn_item_fetch(id);
                }
            },
            ResourceRequest::Invalidate { key } => self.invalidate(&key),
            ResourceRequest::ListSnapshot { respond_to } => {
                let _ = respond_to.send(self.list.snapshot());
            }
            ResourceRequest::ItemSnapshot { id, respond_to } => {
                let snapshot = match self.items.get(&id) {
                    Some(query) => query.snapshot(),
                    None => Query::<T>::default().snapshot(),
                };
                let _ = respond_to.send(snapshot);
            }
        }
    }

    fn handle_completion(&mut self, done: Completion<T>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match done {
            Completion::ListFetched(result) => {
                let result = result.map(|mut rows| {
                    self.keep_provisional(&mut rows);
                    rows
                });
                match &result {
                    Ok(rows) => debug!(rows = rows.len(), "List fetched"),
                    Err(e) => warn!(error = %e, "List fetch failed"),
                }
                if self.list.settle(result) {
                    debug!("List changed during fetch, refetching for late readers");
                    self.spawn_list_fetch();
                }
            }
            Completion::ItemFetched { id, result } => {
                if let Err(e) = &result {
                    warn!(%id, error = %e, "Item fetch failed");
                }
                let refetch = self
                    .items
                    .get_mut(&id)
                    .is_some_and(|query| query.settle(result));
                if refetch {
                    debug!(%id, "Item changed during fetch, refetching for late readers");
                    self.spawn_item_fetch(id);
                }
            }
            Completion::Created {
                provisional,
                result,
                respond_to,
            } => {
                let slot = provisional.as_ref().and_then(|id| self.take_provisional(id));
                match result {
                    Ok(created) => {
                        info!(id = %created.id(), "Created");
                        if let (Some(index), Some(rows)) = (slot, self.list.data.as_mut()) {
                            rows.insert(index.min(rows.len()), created.clone());
                        }
                        self.invalidate(&QueryKey::List);
                        let _ = respond_to.send(Ok(created));
                    }
                    Err(e) => {
                        if slot.is_some() {
                            warn!(error = %e, "Create failed, optimistic insert rolled back");
                        } else {
                            warn!(error = %e, "Create failed");
                        }
                        let _ = respond_to.send(Err(FrameworkError::Api(e)));
                    }
                }
            }
            Completion::Updated { id, result, respond_to } => {
                match &result {
                    Ok(_) => {
                        info!(%id, "Updated");
                        self.invalidate(&QueryKey::List);
                        self.invalidate(&QueryKey::Item(id));
                    }
                    Err(e) => warn!(%id, error = %e, "Update failed"),
                }
                let _ = respond_to.send(result.map_err(FrameworkError::Api));
            }
            Completion::Deleted { id, result, respond_to } => {
                match &result {
                    Ok(()) => {
                        info!(%id, "Deleted");
                        self.invalidate(&QueryKey::List);
                        self.items.remove(&id);
                    }
                    Err(e) => warn!(%id, error = %e, "Delete failed"),
                }
                let _ = respond_to.send(result.map_err(FrameworkError::Api));
            }
        }
    }

    fn invalidate(&mut self, key: &QueryKey<T::Id>) {
        match key {
            QueryKey::List => self.list.invalidate(),
            QueryKey::Item(id) => {
                if let Some(query) = self.items.get_mut(id) {
                    query.invalidate();
                }
            }
        }
    }

    // --- Optimistic inserts ---

    fn insert_provisional(&mut self, payload: &T::CreatePayload) -> Option<T::Id> {
        let rows = self.list.data.as_mut()?;
        let id = T::provisional_id(self.next_provisional);
        self.next_provisional += 1;
        rows.insert(0, T::from_create(id.clone(), payload));
        self.provisional.push(id.clone());
        debug!(%id, "Optimistic insert applied");
        Some(id)
    }

    /// Removes a provisional row, returning where it sat in the list.
    fn take_provisional(&mut self, id: &T::Id) -> Option<usize> {
        self.provisional.retain(|p| p != id);
        let rows = self.list.data.as_mut()?;
        let index = rows.iter().position(|row| row.id() == id)?;
        rows.remove(index);
        Some(index)
    }

    /// A refetch that lands while creates are pending keeps their rows on top.
    fn keep_provisional(&self, rows: &mut Vec<T>) {
        if self.provisional.is_empty() {
            return;
        }
        let mut merged: Vec<T> = self
            .list
            .data
            .iter()
            .flatten()
            .filter(|row| self.provisional.contains(row.id()))
            .cloned()
            .collect();
        merged.append(rows);
        *rows = merged;
    }

    // --- Network calls ---

    fn spawn_list_fetch(&mut self) {
        if self.list.in_flight {
            return;
        }
        self.list.in_flight = true;
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = match backend.get(T::COLLECTION).await {
                Ok(body) => decode::<Vec<T>>(body),
                Err(e) => Err(e),
            };
            Completion::ListFetched(result)
        });
    }

    fn spawn_item_fetch(&mut self, id: T::Id) {
        let Some(query) = self.items.get_mut(&id) else {
            return;
        };
        if query.in_flight {
            return;
        }
        query.in_flight = true;
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = match backend.get(&item_path::<T>(&id)).await {
                Ok(body) => decode::<T>(body),
                Err(e) => Err(e),
            };
            Completion::ItemFetched { id, result }
        });
    }

    fn spawn_create(&mut self, payload: T::CreatePayload, provisional: Option<T::Id>, respond_to: Response<T>) {
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = match encode(&payload) {
                Ok(body) => match backend.post(T::COLLECTION, body).await {
                    Ok(body) => decode::<T>(body),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };
            Completion::Created {
                provisional,
                result,
                respond_to,
            }
        });
    }

    fn spawn_update(&mut self, id: T::Id, patch: T::Patch, respond_to: Response<T>) {
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = match encode(&patch) {
                Ok(body) => match backend.put(&item_path::<T>(&id), body).await {
                    Ok(body) => decode::<T>(body),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };
            Completion::Updated { id, result, respond_to }
        });
    }

    fn spawn_delete(&mut self, id: T::Id, respond_to: Response<()>) {
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.delete(&item_path::<T>(&id)).await;
            Completion::Deleted { id, result, respond_to }
        });
    }

    fn spawn<F>(&mut self, call: F)
    where
        F: std::future::Future<Output = Completion<T>> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(call.await);
        });
    }
}

fn item_path<T: Entity>(id: &T::Id) -> String {
    format!("{}/{}", T::COLLECTION, id)
}

fn decode<V: DeserializeOwned>(body: Value) -> Result<V, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn encode<V: Serialize>(value: &V) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Encode(e.to_string()))
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await?
    }

    pub async fn get(&self, id: T::Id) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to })
            .await?
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await?
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await?
    }

    pub async fn refetch(&self, key: QueryKey<T::Id>) -> Result<(), FrameworkError> {
        self.sender
            .send(ResourceRequest::Refetch { key })
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    pub async fn invalidate(&self, key: QueryKey<T::Id>) -> Result<(), FrameworkError> {
        self.sender
            .send(ResourceRequest::Invalidate { key })
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    pub async fn list_snapshot(&self) -> Result<QuerySnapshot<Vec<T>>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::ListSnapshot { respond_to })
            .await
    }

    pub async fn item_snapshot(&self, id: T::Id) -> Result<QuerySnapshot<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::ItemSnapshot { id, respond_to })
            .await
    }
}

/// Forces a list refetch every `interval` until the actor goes away.
///
/// The returned handle must be aborted before shutdown: the task holds a
/// client, which keeps the actor alive.
pub fn spawn_polling<T: Entity>(client: ResourceClient<T>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        // The first tick completes immediately; the initial load belongs to the view.
        timer.tick().await;
        loop {
            timer.tick().await;
            debug!(collection = T::COLLECTION, "Polling refetch");
            if client.refetch(QueryKey::List).await.is_err() {
                break;
            }
        }
    })
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================
