//! One-shot event lookups and recommendations.

use crate::config::CatalogConfig;
use crate::feed::{EventFeed, FeedOptions};
use crate::filters::{EventFilters, apply_filters};
use crate::matching::{ScoredEvent, recommend};
use crate::types::{Event, UserProfile};
use chrono::{Days, NaiveDate};
use locali_core::document::{Direction, Document, DocumentId, DocumentStore, DocumentStoreError, Query};
use locali_core::environment::Clock;
use locali_core::identity::UserId;
use std::sync::Arc;

/// Read access to events and user profiles.
///
/// Cloning is cheap; clones share the same store and clock.
#[derive(Clone)]
pub struct EventCatalog {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    config: CatalogConfig,
}

impl EventCatalog {
    /// Create a catalog over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, config: CatalogConfig) -> Self {
        Self { store, clock, config }
    }

    /// Fetch one event.
    ///
    /// # Errors
    ///
    /// Returns the store's read error, or a decode error if the document is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn event(&self, id: &DocumentId) -> Result<Option<Event>, DocumentStoreError> {
        self.store
            .get(&self.config.events_collection, id)
            .await?
            .as_ref()
            .map(Event::from_document)
            .transpose()
    }

    /// Fetch a user's profile.
    ///
    /// # Errors
    ///
    /// Returns the store's read error, or a decode error if the document is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn user_profile(&self, user: &UserId) -> Result<Option<UserProfile>, DocumentStoreError> {
        let id = DocumentId::new(user.as_str());
        self.store
            .get(&self.config.users_collection, &id)
            .await?
            .map(|document| document.decode())
            .transpose()
    }

    /// Every event, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns the store's read error.
    pub async fn all_events(&self) -> Result<Vec<Event>, DocumentStoreError> {
        let query = Query::new(&self.config.events_collection).order_by("date", Direction::Ascending);
        let documents = self.store.query(query).await?;
        Ok(decode_lenient(&documents))
    }

    /// The events that best match a user's interests.
    ///
    /// Uses the configured recommendation limit when `limit` is `None`.
    /// Users without a profile or without interests get no recommendations.
    ///
    /// # Errors
    ///
    /// Returns the store's read error.
    #[tracing::instrument(skip(self))]
    pub async fn recommended_for(
        &self,
        user: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<ScoredEvent>, DocumentStoreError> {
        let interests = self.interests_of(user).await?;
        if interests.is_empty() {
            tracing::debug!("No interests on profile, nothing to recommend");
            return Ok(Vec::new());
        }

        let documents = self.store.query(Query::new(&self.config.events_collection)).await?;
        let events = decode_lenient(&documents);
        let picks = recommend(events, &interests, limit.unwrap_or(self.config.recommendation_limit));

        tracing::debug!(count = picks.len(), "Recommendations ready");
        Ok(picks)
    }

    /// Events dated from today through today + `days`, ordered by date.
    ///
    /// Uses the configured window when `days` is `None`.
    ///
    /// # Errors
    ///
    /// Returns the store's read error.
    pub async fn upcoming(&self, days: Option<u32>) -> Result<Vec<Event>, DocumentStoreError> {
        let days = days.unwrap_or(self.config.upcoming_days);
        let today = self.today();
        let Some(end) = today.checked_add_days(Days::new(u64::from(days))) else {
            return Ok(Vec::new());
        };

        let mut events = self.all_events().await?;
        events.retain(|event| {
            event
                .record
                .calendar_date()
                .is_some_and(|date| (today..=end).contains(&date))
        });
        Ok(events)
    }

    /// Every event scored for `user` and narrowed by `filters`, ordered by date.
    ///
    /// Without a user (or a profile) every score is zero.
    ///
    /// # Errors
    ///
    /// Returns the store's read error.
    pub async fn browse(
        &self,
        user: Option<&UserId>,
        filters: &EventFilters,
    ) -> Result<Vec<ScoredEvent>, DocumentStoreError> {
        let interests = match user {
            Some(user) => self.interests_of(user).await?,
            None => Vec::new(),
        };
        let events = self.all_events().await?;
        Ok(apply_filters(events, &interests, filters, self.today()))
    }

    /// Subscribe to a live event list.
    #[must_use]
    pub fn watch(&self, options: FeedOptions) -> EventFeed {
        EventFeed::watch(
            self.store.as_ref(),
            &self.config.events_collection,
            options,
            Arc::clone(&self.clock),
        )
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    async fn interests_of(&self, user: &UserId) -> Result<Vec<String>, DocumentStoreError> {
        Ok(self
            .user_profile(user)
            .await?
            .map(|profile| profile.interests)
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for EventCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCatalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn decode_lenient(documents: &[Document]) -> Vec<Event> {
    documents
        .iter()
        .filter_map(|document| {
            Event::from_document(document)
                .inspect_err(|error| tracing::warn!(%error, "Skipping undecodable event"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use locali_testing::{InMemoryDocumentStore, test_clock};
    use serde_json::json;

    fn catalog(store: &InMemoryDocumentStore) -> EventCatalog {
        EventCatalog::new(
            Arc::new(store.clone()),
            Arc::new(test_clock()),
            Config::default().catalog,
        )
    }

    fn seeded() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        store.insert("events", "e1", json!({ "title": "Intro to AI", "date": "2025-05-20", "tags": ["AI"] }));
        store.insert("events", "e2", json!({ "title": "Jazz", "date": "2025-05-15", "tags": ["Music"] }));
        store.insert(
            "events",
            "e3",
            json!({ "title": "AI and Music", "date": "2025-06-20", "tags": ["AI", "Music"] }),
        );
        store.insert("users", "u1", json!({ "interests": ["ai"], "displayName": "Ada" }));
        store.insert("users", "u2", json!({ "displayName": "Grace" }));
        store
    }

    #[tokio::test]
    async fn fetches_event_and_profile() {
        let store = seeded();
        let catalog = catalog(&store);

        let event = catalog.event(&"e2".into()).await.unwrap().unwrap();
        assert_eq!(event.record.title, "Jazz");
        assert!(catalog.event(&"missing".into()).await.unwrap().is_none());

        let profile = catalog.user_profile(&UserId::new("u1")).await.unwrap().unwrap();
        assert_eq!(profile.interests, vec!["ai"]);
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn recommendations_rank_positive_scores() {
        let store = seeded();
        let catalog = catalog(&store);

        let picks = catalog.recommended_for(&UserId::new("u1"), None).await.unwrap();
        let ranked: Vec<_> = picks.iter().map(|p| (p.event.id.as_str(), p.score)).collect();
        assert_eq!(ranked, vec![("e1", 100), ("e3", 50)]);

        let one = catalog.recommended_for(&UserId::new("u1"), Some(1)).await.unwrap();
        assert_eq!(one.len(), 1);
    }

    #[tokio::test]
    async fn no_interests_no_recommendations() {
        let store = seeded();
        let catalog = catalog(&store);

        assert!(catalog.recommended_for(&UserId::new("u2"), None).await.unwrap().is_empty());
        assert!(catalog.recommended_for(&UserId::new("nobody"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upcoming_uses_configured_window() {
        let store = seeded();
        let catalog = catalog(&store);

        let ids: Vec<_> = catalog
            .upcoming(None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["e2", "e1"]);
    }

    #[tokio::test]
    async fn browse_scores_and_filters() {
        let store = seeded();
        let catalog = catalog(&store);
        let filters = EventFilters {
            threshold: Some(50),
            ..EventFilters::default()
        };

        let results = catalog.browse(Some(&UserId::new("u1")), &filters).await.unwrap();
        let ids: Vec<_> = results.iter().map(|s| s.event.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);

        let anonymous = catalog.browse(None, &EventFilters::default()).await.unwrap();
        assert_eq!(anonymous.len(), 3);
        assert!(anonymous.iter().all(|s| s.score == 0));
    }

    #[tokio::test]
    async fn read_failures_propagate() {
        let store = seeded();
        store.fail_reads(Some("offline"));
        let catalog = catalog(&store);

        let err = catalog.recommended_for(&UserId::new("u1"), None).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::ReadFailed { .. }));
    }
}
