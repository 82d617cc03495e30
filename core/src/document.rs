//! Document store contract for the hosted event database.
//!
//! The events core never talks to a concrete database. It depends on the
//! [`DocumentStore`] trait, which models a schemaless document database with
//! collections of JSON documents, store-assigned identifiers and live query
//! subscriptions.
//!
//! # Live subscriptions
//!
//! [`DocumentStore::subscribe`] registers a [`SnapshotListener`] for a
//! [`Query`]. The listener receives the complete, ordered result set every
//! time it changes; there is no incremental diff. The returned
//! [`Subscription`] is the unsubscribe handle: dropping it (or calling
//! [`Subscription::unsubscribe`]) stops further deliveries.
//!
//! # Implementations
//!
//! - `InMemoryDocumentStore` (in `locali-testing`): deterministic, supports failure injection
//!
//! # Example
//!
//! ```no_run
//! use locali_core::document::{Direction, DocumentStore, DocumentStoreError, Query};
//!
//! async fn example(store: &dyn DocumentStore) -> Result<(), DocumentStoreError> {
//!     let id = store.create("events", serde_json::json!({ "title": "AI Workshop" })).await?;
//!     let doc = store.get("events", &id).await?;
//!     assert!(doc.is_some());
//!
//!     let upcoming = store
//!         .query(Query::new("events").order_by("date", Direction::Ascending).limit(10))
//!         .await?;
//!     println!("{} events", upcoming.len());
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`DocumentStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DocumentStoreError>> + Send + 'a>>;

/// Callback invoked with each full snapshot of a live query (or its failure).
pub type SnapshotListener = Box<dyn Fn(Result<Vec<Document>, DocumentStoreError>) + Send + Sync>;

/// Errors that can occur during document store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// Writing a document failed.
    #[error("Write to '{collection}' failed: {reason}")]
    WriteFailed {
        /// Target collection
        collection: String,
        /// Reason reported by the store
        reason: String,
    },

    /// Reading a document or running a query failed.
    #[error("Read from '{collection}' failed: {reason}")]
    ReadFailed {
        /// Source collection
        collection: String,
        /// Reason reported by the store
        reason: String,
    },

    /// A live subscription could not be established or was interrupted.
    #[error("Subscription to '{collection}' failed: {reason}")]
    SubscriptionFailed {
        /// Subscribed collection
        collection: String,
        /// Reason reported by the store
        reason: String,
    },

    /// A document could not be converted to or from its typed form.
    #[error("Document {id} could not be decoded: {reason}")]
    Decode {
        /// Offending document
        id: DocumentId,
        /// Serde error message
        reason: String,
    },

    /// A value could not be encoded as a document body.
    #[error("Document body could not be encoded: {0}")]
    Encode(String),
}

/// Store-assigned identifier of a document.
///
/// Identifiers are opaque strings; only the store creates them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an identifier produced by a store.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A stored document: its identifier plus a JSON body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier
    pub id: DocumentId,
    /// Document body
    pub data: Value,
}

impl Document {
    /// Create a document from an identifier and body.
    #[must_use]
    pub fn new(id: impl Into<DocumentId>, data: Value) -> Self {
        Self { id: id.into(), data }
    }

    /// Decode the document body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Decode`] if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DocumentStoreError> {
        T::deserialize(&self.data).map_err(|e| DocumentStoreError::Decode {
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }

    /// Look up a top-level field of the body.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Comparison applied by a [`FieldFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals the value
    Eq,
    /// Field is an array containing the value
    ArrayContains,
}

/// A single `where` clause of a query.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    /// Top-level field name
    pub field: String,
    /// Comparison
    pub op: FilterOp,
    /// Operand
    pub value: Value,
}

impl FieldFilter {
    /// Whether a document body satisfies this clause.
    ///
    /// A missing field never matches.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        let Some(actual) = data.get(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual == &self.value,
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.contains(&self.value)),
        }
    }
}

/// Sort direction for [`OrderBy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

/// Ordering clause of a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    /// Top-level field name
    pub field: String,
    /// Sort direction
    pub direction: Direction,
}

/// A collection query: filters, an optional ordering and an optional limit.
///
/// Built with a small fluent API:
///
/// ```
/// use locali_core::document::{Direction, Query};
///
/// let query = Query::new("events")
///     .where_eq("featured", true)
///     .order_by("date", Direction::Ascending)
///     .limit(5);
/// assert_eq!(query.collection, "events");
/// assert_eq!(query.filters.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    /// Collection to read
    pub collection: String,
    /// Conjunction of filters
    pub filters: Vec<FieldFilter>,
    /// Optional ordering
    pub order_by: Option<OrderBy>,
    /// Optional maximum number of results
    pub limit: Option<usize>,
}

impl Query {
    /// Query every document of a collection.
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Keep documents whose `field` equals `value`.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        });
        self
    }

    /// Keep documents whose array `field` contains `value`.
    #[must_use]
    pub fn where_array_contains(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op: FilterOp::ArrayContains,
            value: value.into(),
        });
        self
    }

    /// Order results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Return at most `count` results.
    #[must_use]
    pub const fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Whether a document satisfies every filter.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(&document.data))
    }

    /// Evaluate the query over documents given in store (insertion) order.
    ///
    /// Sorting is stable, so documents with equal sort keys keep store order.
    #[must_use]
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut results: Vec<Document> = documents.into_iter().filter(|d| self.matches(d)).collect();

        if let Some(order) = &self.order_by {
            results.sort_by(|a, b| {
                let ordering = compare_values(a.field(&order.field), b.field(&order.field));
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }
}

/// Total order over optional JSON values used for query ordering.
///
/// Missing < null < bool < number < string < array/object. Values of the
/// same kind compare naturally; arrays and objects compare equal.
#[must_use]
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::Array(_) | Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Unsubscribe handle for a live query.
///
/// Dropping the handle unsubscribes. [`Subscription::unsubscribe`] does the
/// same explicitly. The teardown closure runs at most once.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Create a handle that runs `teardown` when released.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A handle with nothing to tear down.
    pub const fn detached() -> Self {
        Self { teardown: None }
    }

    /// Stop receiving snapshots.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}

/// Document store abstraction over the hosted event database.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; reducers capture an
/// `Arc<dyn DocumentStore>` inside `Effect::Future`.
///
/// # Dyn Compatibility
///
/// Methods return explicit boxed futures instead of `async fn` so the
/// trait can be used as `Arc<dyn DocumentStore>`.
pub trait DocumentStore: Send + Sync {
    /// Create a document and return the identifier the store assigned.
    ///
    /// # Errors
    ///
    /// - `WriteFailed`: the store rejected or could not complete the write
    fn create<'a>(&'a self, collection: &'a str, data: Value) -> StoreFuture<'a, DocumentId>;

    /// Fetch one document by identifier.
    ///
    /// Returns `Ok(None)` when the document does not exist.
    ///
    /// # Errors
    ///
    /// - `ReadFailed`: the store could not be read
    fn get<'a>(&'a self, collection: &'a str, id: &'a DocumentId) -> StoreFuture<'a, Option<Document>>;

    /// Run a query once and return the ordered result set.
    ///
    /// # Errors
    ///
    /// - `ReadFailed`: the store could not be read
    fn query(&self, query: Query) -> StoreFuture<'_, Vec<Document>>;

    /// Register a live query.
    ///
    /// The listener is called with the current result set and then with the
    /// full result set after every change. Failures of an established
    /// subscription are delivered to the listener as `Err`.
    ///
    /// # Errors
    ///
    /// - `SubscriptionFailed`: the subscription could not be established
    fn subscribe(&self, query: Query, listener: SnapshotListener) -> Result<Subscription, DocumentStoreError>;
}
