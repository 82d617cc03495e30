//! # Locali Events
//!
//! The events core of Locali: match scoring and listings over live event
//! data, plus the conversational booking flow that creates new events.
//!
//! ## Components
//!
//! - [`matching`]: interest/tag affinity scores and recommendation ranking
//! - [`filters`]: listing filters (threshold, search, date window, location, tags)
//! - [`feed`]: live event list backed by a document store subscription
//! - [`catalog`]: one-shot lookups (event, user profile, recommendations)
//! - [`booking`]: the step-by-step booking conversation and its reducer
//!
//! ## Example
//!
//! ```ignore
//! use locali_events::booking::{BookingAction, BookingEnvironment, BookingReducer, ConversationState};
//! use locali_runtime::Store;
//!
//! let store = Store::new(ConversationState::new(), BookingReducer, environment);
//! let mut handle = store.send(BookingAction::submit("3/15/2025")).await?;
//! handle.wait().await;
//! ```

pub mod booking;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod filters;
pub mod matching;
pub mod types;

pub use catalog::EventCatalog;
pub use config::Config;
pub use error::{BookingError, ValidationError};
pub use feed::{EventFeed, FeedOptions, FeedSnapshot};
pub use filters::{DateWindow, EventFilters, LocationKind};
pub use matching::{ScoredEvent, match_score};
pub use types::{Event, EventRecord, Room, UserProfile};
