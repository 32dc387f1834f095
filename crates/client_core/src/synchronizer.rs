use std::{
    collections::{HashMap, HashSet},
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use futures::future::{abortable, AbortHandle, Aborted};
use shared::protocol::StatusChange;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    error::{SyncError, SyncResult},
    resource::{Resource, StatusResource},
    transport::RestTransport,
};

/// Change notifications a rendering layer subscribes to.
///
/// `InFlightChanged` is how views disable their submit controls while a
/// mutation awaits its response.
#[derive(Debug, Clone)]
pub enum CollectionEvent<R: Resource> {
    Refreshed { records: Vec<R> },
    Created { record: R },
    Replaced { record: R },
    Removed { id: R::Id },
    InFlightChanged { operation: &'static str, active: bool },
}

struct MirrorState<R: Resource> {
    records: Vec<R>,
    create_in_flight: bool,
    busy_ids: HashSet<R::Id>,
}

/// Keeps one displayed collection consistent with the server.
///
/// The records held here are a cache, never the source of truth: every
/// mutation sends the request first and only rewrites the mirror from the
/// server's response. On any failure the mirror is left exactly as it was.
pub struct ViewSynchronizer<R: Resource> {
    transport: Arc<RestTransport>,
    state: Mutex<MirrorState<R>>,
    events: broadcast::Sender<CollectionEvent<R>>,
    aborts: Mutex<HashMap<u64, AbortHandle>>,
    next_request: AtomicU64,
    detached: AtomicBool,
}

impl<R: Resource> ViewSynchronizer<R> {
    pub fn new(transport: Arc<RestTransport>) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            transport,
            state: Mutex::new(MirrorState {
                records: Vec::new(),
                create_in_flight: false,
                busy_ids: HashSet::new(),
            }),
            events,
            aborts: Mutex::new(HashMap::new()),
            next_request: AtomicU64::new(0),
            detached: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent<R>> {
        self.events.subscribe()
    }

    /// Clone of the mirror for display.
    pub async fn snapshot(&self) -> Vec<R> {
        self.state.lock().await.records.clone()
    }

    /// Tears the synchronizer off its view: aborts every in-flight request
    /// and refuses all future ones. Completions that raced the teardown
    /// never touch the mirror.
    pub async fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
        let handles: Vec<AbortHandle> = self.aborts.lock().await.drain().map(|(_, h)| h).collect();
        for handle in &handles {
            handle.abort();
        }
        if !handles.is_empty() {
            info!(
                collection = R::COLLECTION,
                aborted = handles.len(),
                "detached with requests in flight"
            );
        }
    }

    pub async fn load(&self) -> SyncResult<Vec<R>> {
        let url = self.transport.collection_url(R::COLLECTION);
        let records: Vec<R> = self.guarded(self.transport.get_json(&url)).await?;

        let mut state = self.state.lock().await;
        if self.is_detached() {
            return Err(SyncError::Detached);
        }
        state.records = records.clone();
        debug!(
            collection = R::COLLECTION,
            count = records.len(),
            "collection reloaded"
        );
        let _ = self.events.send(CollectionEvent::Refreshed {
            records: records.clone(),
        });
        Ok(records)
    }

    /// Sends the draft; the server-assigned record from the response is
    /// what gets appended, server-computed fields included. A second
    /// create on this collection while one is pending is rejected.
    pub async fn create(&self, draft: &R::Draft) -> SyncResult<R> {
        {
            let mut state = self.state.lock().await;
            if state.create_in_flight {
                return Err(SyncError::MutationInFlight {
                    operation: "create",
                });
            }
            state.create_in_flight = true;
        }
        self.emit_in_flight("create", true);

        let url = self.transport.collection_url(R::COLLECTION);
        let result = self.guarded(self.transport.post_json(&url, draft)).await;

        self.state.lock().await.create_in_flight = false;
        self.emit_in_flight("create", false);

        let record: R = result?;
        let mut state = self.state.lock().await;
        if self.is_detached() {
            return Err(SyncError::Detached);
        }
        state.records.push(record.clone());
        let _ = self.events.send(CollectionEvent::Created {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Partial update; the local entry is wholesale-replaced by the
    /// response, never merged field by field, because the server owns
    /// derived fields.
    pub async fn update(&self, id: R::Id, patch: &R::Patch) -> SyncResult<R> {
        self.begin_record_mutation("update", id).await?;
        let url = self.transport.record_url(R::COLLECTION, id);
        let result = self.guarded(self.transport.put_json(&url, patch)).await;
        self.end_record_mutation("update", id).await;
        self.replace_entry(result?).await
    }

    pub async fn remove(&self, id: R::Id) -> SyncResult<()> {
        self.begin_record_mutation("delete", id).await?;
        let url = self.transport.record_url(R::COLLECTION, id);
        let result = self.guarded(self.transport.delete(&url)).await;
        self.end_record_mutation("delete", id).await;
        result?;

        let mut state = self.state.lock().await;
        if self.is_detached() {
            return Err(SyncError::Detached);
        }
        state.records.retain(|existing| existing.id() != id);
        let _ = self.events.send(CollectionEvent::Removed { id });
        Ok(())
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn emit_in_flight(&self, operation: &'static str, active: bool) {
        let _ = self
            .events
            .send(CollectionEvent::InFlightChanged { operation, active });
    }

    async fn begin_record_mutation(&self, operation: &'static str, id: R::Id) -> SyncResult<()> {
        {
            let mut state = self.state.lock().await;
            if !state.busy_ids.insert(id) {
                return Err(SyncError::MutationInFlight { operation });
            }
        }
        self.emit_in_flight(operation, true);
        Ok(())
    }

    async fn end_record_mutation(&self, operation: &'static str, id: R::Id) {
        self.state.lock().await.busy_ids.remove(&id);
        self.emit_in_flight(operation, false);
    }

    async fn replace_entry(&self, record: R) -> SyncResult<R> {
        let mut state = self.state.lock().await;
        if self.is_detached() {
            return Err(SyncError::Detached);
        }
        match state
            .records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
        {
            Some(slot) => *slot = record.clone(),
            // A concurrent reload can have dropped the entry; keep the
            // mirror converging with the server.
            None => state.records.push(record.clone()),
        }
        let _ = self.events.send(CollectionEvent::Replaced {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Runs one server round trip under the detach contract.
    async fn guarded<T, F>(&self, request: F) -> SyncResult<T>
    where
        F: Future<Output = SyncResult<T>>,
    {
        if self.is_detached() {
            return Err(SyncError::Detached);
        }
        let (request, handle) = abortable(request);
        let key = self.next_request.fetch_add(1, Ordering::Relaxed);
        self.aborts.lock().await.insert(key, handle);
        let outcome = request.await;
        self.aborts.lock().await.remove(&key);
        match outcome {
            Ok(result) => result,
            Err(Aborted) => Err(SyncError::Detached),
        }
    }
}

impl<R: StatusResource> ViewSynchronizer<R> {
    /// Specialized update touching only the lifecycle field; same
    /// replace-on-success contract as `update`.
    pub async fn change_status(&self, id: R::Id, status: R::Status) -> SyncResult<R> {
        self.begin_record_mutation("status", id).await?;
        let url = self.transport.status_url(R::COLLECTION, id);
        let body = StatusChange { status };
        let result = self.guarded(self.transport.put_json(&url, &body)).await;
        self.end_record_mutation("status", id).await;
        self.replace_entry(result?).await
    }
}

#[cfg(test)]
#[path = "tests/synchronizer_tests.rs"]
mod tests;
