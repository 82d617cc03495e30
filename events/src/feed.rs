//! Live event list backed by a document store subscription.
//!
//! Each snapshot from the store replaces the whole list. Nothing is merged.
//! Consumers read the latest [`FeedSnapshot`] or await the next change.
//! Closing or dropping the [`EventFeed`] unsubscribes.

use crate::types::Event;
use chrono::{Days, NaiveDate};
use locali_core::document::{
    Direction, Document, DocumentStore, DocumentStoreError, Query, Subscription,
};
use locali_core::environment::Clock;
use std::sync::Arc;
use tokio::sync::watch;

/// What an [`EventFeed`] subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedOptions {
    /// Only events with `featured == true`
    pub only_featured: bool,
    /// Only events dated from today through today + N days
    pub upcoming_days: Option<u32>,
    /// At most this many events from the store (applied before the upcoming window)
    pub limit: Option<usize>,
}

impl FeedOptions {
    /// Every event, ordered by date.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            only_featured: false,
            upcoming_days: None,
            limit: None,
        }
    }

    /// Events in the next `days` days.
    #[must_use]
    pub const fn upcoming(days: u32) -> Self {
        Self {
            only_featured: false,
            upcoming_days: Some(days),
            limit: None,
        }
    }

    /// The store query for these options.
    #[must_use]
    pub fn query(&self, collection: &str) -> Query {
        let mut query = Query::new(collection);
        if self.only_featured {
            query = query.where_eq("featured", true);
        }
        query = query.order_by("date", Direction::Ascending);
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

/// The feed's current view.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    /// Events from the latest successful snapshot
    pub events: Vec<Event>,
    /// No snapshot or error has arrived yet
    pub loading: bool,
    /// Most recent subscription failure, cleared by the next good snapshot
    pub error: Option<DocumentStoreError>,
}

impl FeedSnapshot {
    const fn loading() -> Self {
        Self {
            events: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// A live, ordered list of events.
#[derive(Debug)]
pub struct EventFeed {
    receiver: watch::Receiver<FeedSnapshot>,
    subscription: Option<Subscription>,
}

impl EventFeed {
    /// Subscribe to `collection` with `options`.
    ///
    /// A subscription that cannot be established yields a feed that is not
    /// loading, has no events and carries the error.
    #[tracing::instrument(skip(store, clock))]
    pub fn watch(
        store: &dyn DocumentStore,
        collection: &str,
        options: FeedOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (sender, mut receiver) = watch::channel(FeedSnapshot::loading());
        let sender = Arc::new(sender);
        let listener_sender = Arc::clone(&sender);
        let collection_name = collection.to_string();

        let listener = Box::new(move |result: Result<Vec<Document>, DocumentStoreError>| match result {
            Ok(documents) => {
                let today = clock.now().date_naive();
                let events = decode_events(&documents, options.upcoming_days, today);
                tracing::debug!(collection = %collection_name, count = events.len(), "Event snapshot");
                listener_sender.send_replace(FeedSnapshot {
                    events,
                    loading: false,
                    error: None,
                });
            },
            Err(error) => {
                tracing::error!(collection = %collection_name, %error, "Error in events snapshot");
                listener_sender.send_modify(|snapshot| {
                    snapshot.loading = false;
                    snapshot.error = Some(error);
                });
            },
        });

        let subscription = match store.subscribe(options.query(collection), listener) {
            Ok(subscription) => Some(subscription),
            Err(error) => {
                tracing::error!(%error, "Could not subscribe to events");
                sender.send_replace(FeedSnapshot {
                    events: Vec::new(),
                    loading: false,
                    error: Some(error),
                });
                None
            },
        };

        // changed() reports updates after construction only
        receiver.borrow_and_update();

        Self {
            receiver,
            subscription,
        }
    }

    /// The current view.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.receiver.borrow().clone()
    }

    /// Events of the current view.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.receiver.borrow().events.clone()
    }

    /// Wait for the next change.
    ///
    /// Returns `false` once no further changes can arrive.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// A receiver that observes the same view.
    #[must_use]
    pub fn receiver(&self) -> watch::Receiver<FeedSnapshot> {
        self.receiver.clone()
    }

    /// Whether the feed is still subscribed.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop receiving snapshots.
    pub fn close(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

/// Decode documents in order, skipping any that do not decode.
fn decode_events(documents: &[Document], upcoming_days: Option<u32>, today: NaiveDate) -> Vec<Event> {
    let end = upcoming_days.and_then(|days| today.checked_add_days(Days::new(u64::from(days))));

    documents
        .iter()
        .filter_map(|document| match Event::from_document(document) {
            Ok(event) => Some(event),
            Err(error) => {
                tracing::warn!(%error, "Skipping undecodable event");
                None
            },
        })
        .filter(|event| match (upcoming_days, end) {
            (None, _) => true,
            (Some(_), Some(end)) => event
                .record
                .calendar_date()
                .is_some_and(|date| (today..=end).contains(&date)),
            (Some(_), None) => false,
        })
        .collect()
}
