//! In-memory document store for fast, deterministic tests.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use locali_core::document::{
    Document, DocumentId, DocumentStore, DocumentStoreError, Query, SnapshotListener, StoreFuture,
    Subscription,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type SharedListener = Arc<dyn Fn(Result<Vec<Document>, DocumentStoreError>) + Send + Sync>;

struct LiveQuery {
    query: Query,
    listener: SharedListener,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    live: HashMap<u64, LiveQuery>,
    next_document: u64,
    next_listener: u64,
    creates: usize,
    write_failure: Option<String>,
    read_failure: Option<String>,
    subscription_failure: Option<String>,
    write_delay: Option<Duration>,
}

impl Inner {
    /// Snapshots owed to live queries on `collection`, computed under the lock.
    fn pending_snapshots(&self, collection: &str) -> Vec<(SharedListener, Vec<Document>)> {
        let documents = self.collections.get(collection).cloned().unwrap_or_default();
        self.live
            .values()
            .filter(|live| live.query.collection == collection)
            .map(|live| (Arc::clone(&live.listener), live.query.apply(documents.clone())))
            .collect()
    }
}

/// In-memory implementation of [`DocumentStore`].
///
/// Documents are kept per collection in insertion order and identifiers are
/// assigned sequentially (`doc-1`, `doc-2`, ...). Every write delivers a
/// fresh snapshot to each live query on the written collection. Listeners
/// are always called outside the internal lock, so they may read the store.
///
/// Failures can be injected per operation kind to exercise error paths.
///
/// # Example
///
/// ```
/// use locali_testing::InMemoryDocumentStore;
/// use locali_core::document::{DocumentStore, Query};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new();
/// let id = store.create("events", json!({ "title": "AI Workshop" })).await?;
/// assert_eq!(id.as_str(), "doc-1");
///
/// let all = store.query(Query::new("events")).await?;
/// assert_eq!(all.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a document with a known identifier.
    ///
    /// Live queries on the collection receive a new snapshot.
    pub fn insert(&self, collection: &str, id: impl Into<DocumentId>, data: Value) {
        let id = id.into();
        let pending = {
            let mut inner = self.inner.lock().unwrap();
            let documents = inner.collections.entry(collection.to_string()).or_default();
            match documents.iter_mut().find(|d| d.id == id) {
                Some(existing) => existing.data = data,
                None => documents.push(Document::new(id, data)),
            }
            inner.pending_snapshots(collection)
        };
        deliver(pending);
    }

    /// Remove a document. Returns whether it existed.
    pub fn remove(&self, collection: &str, id: &DocumentId) -> bool {
        let (removed, pending) = {
            let mut inner = self.inner.lock().unwrap();
            let removed = inner.collections.get_mut(collection).is_some_and(|documents| {
                let before = documents.len();
                documents.retain(|d| &d.id != id);
                documents.len() != before
            });
            let pending = if removed {
                inner.pending_snapshots(collection)
            } else {
                Vec::new()
            };
            (removed, pending)
        };
        deliver(pending);
        removed
    }

    /// Make every subsequent `create` fail with `reason` (or succeed again with `None`).
    pub fn fail_writes(&self, reason: Option<&str>) {
        self.inner.lock().unwrap().write_failure = reason.map(str::to_string);
    }

    /// Make every subsequent `get`/`query` fail with `reason` (or succeed again with `None`).
    pub fn fail_reads(&self, reason: Option<&str>) {
        self.inner.lock().unwrap().read_failure = reason.map(str::to_string);
    }

    /// Make every subsequent `subscribe` fail with `reason` (or succeed again with `None`).
    pub fn fail_subscriptions(&self, reason: Option<&str>) {
        self.inner.lock().unwrap().subscription_failure = reason.map(str::to_string);
    }

    /// Delay every `create` by `delay` before it completes.
    pub fn delay_writes(&self, delay: Duration) {
        self.inner.lock().unwrap().write_delay = Some(delay);
    }

    /// Interrupt live queries on `collection` with a subscription error.
    pub fn emit_error(&self, collection: &str, reason: &str) {
        let listeners: Vec<SharedListener> = {
            let inner = self.inner.lock().unwrap();
            inner
                .live
                .values()
                .filter(|live| live.query.collection == collection)
                .map(|live| Arc::clone(&live.listener))
                .collect()
        };
        for listener in listeners {
            listener(Err(DocumentStoreError::SubscriptionFailed {
                collection: collection.to_string(),
                reason: reason.to_string(),
            }));
        }
    }

    /// Number of successful `create` calls
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.inner.lock().unwrap().creates
    }

    /// Documents of `collection` in insertion order
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of documents in `collection`
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Number of live queries currently registered
    #[must_use]
    pub fn live_query_count(&self) -> usize {
        self.inner.lock().unwrap().live.len()
    }

    fn create_now(&self, collection: &str, data: Value) -> Result<DocumentId, DocumentStoreError> {
        let (id, pending) = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(reason) = &inner.write_failure {
                return Err(DocumentStoreError::WriteFailed {
                    collection: collection.to_string(),
                    reason: reason.clone(),
                });
            }

            inner.next_document += 1;
            let id = DocumentId::new(format!("doc-{}", inner.next_document));
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(Document::new(id.clone(), data));
            inner.creates += 1;
            (id, inner.pending_snapshots(collection))
        };
        deliver(pending);
        Ok(id)
    }

    fn check_read(&self, collection: &str) -> Result<(), DocumentStoreError> {
        match &self.inner.lock().unwrap().read_failure {
            Some(reason) => Err(DocumentStoreError::ReadFailed {
                collection: collection.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn deliver(pending: Vec<(SharedListener, Vec<Document>)>) {
    for (listener, snapshot) in pending {
        listener(Ok(snapshot));
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("InMemoryDocumentStore")
            .field("collections", &inner.collections.keys().collect::<Vec<_>>())
            .field("live_queries", &inner.live.len())
            .finish_non_exhaustive()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn create<'a>(&'a self, collection: &'a str, data: Value) -> StoreFuture<'a, DocumentId> {
        Box::pin(async move {
            let delay = self.inner.lock().unwrap().write_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.create_now(collection, data)
        })
    }

    fn get<'a>(&'a self, collection: &'a str, id: &'a DocumentId) -> StoreFuture<'a, Option<Document>> {
        Box::pin(async move {
            self.check_read(collection)?;
            Ok(self
                .inner
                .lock()
                .unwrap()
                .collections
                .get(collection)
                .and_then(|documents| documents.iter().find(|d| &d.id == id).cloned()))
        })
    }

    fn query(&self, query: Query) -> StoreFuture<'_, Vec<Document>> {
        Box::pin(async move {
            self.check_read(&query.collection)?;
            Ok(query.apply(self.documents(&query.collection)))
        })
    }

    fn subscribe(&self, query: Query, listener: SnapshotListener) -> Result<Subscription, DocumentStoreError> {
        let listener: SharedListener = Arc::from(listener);

        let (key, initial) = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(reason) = &inner.subscription_failure {
                return Err(DocumentStoreError::SubscriptionFailed {
                    collection: query.collection.clone(),
                    reason: reason.clone(),
                });
            }

            inner.next_listener += 1;
            let key = inner.next_listener;
            let documents = inner.collections.get(&query.collection).cloned().unwrap_or_default();
            let initial = query.apply(documents);
            inner.live.insert(
                key,
                LiveQuery {
                    query,
                    listener: Arc::clone(&listener),
                },
            );
            (key, initial)
        };

        listener(Ok(initial));

        let inner = Arc::clone(&self.inner);
        Ok(Subscription::new(move || {
            inner.lock().unwrap().live.remove(&key);
        }))
    }
}
