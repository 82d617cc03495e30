//! Configuration management for the events core.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::types::Room;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Booking conversation settings
    pub booking: BookingConfig,
    /// Listing and recommendation settings
    pub catalog: CatalogConfig,
    /// Default log filter directive
    pub log_level: String,
}

/// Booking conversation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// The single bookable room
    pub room: Room,
    /// Pause before the assistant replies, in milliseconds
    pub reply_delay_ms: u64,
    /// Tags attached to every event created through the conversation
    pub default_tags: Vec<String>,
    /// Collection new events are written to
    pub events_collection: String,
}

impl BookingConfig {
    /// Pause before the assistant replies.
    #[must_use]
    pub const fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

/// Listing and recommendation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Collection holding events
    pub events_collection: String,
    /// Collection holding user profiles
    pub users_collection: String,
    /// Default number of recommendations
    pub recommendation_limit: usize,
    /// Default window, in days, for upcoming-event lists
    pub upcoming_days: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Uses default values for any missing variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparseable numeric values fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let events_collection = lookup("LOCALI_EVENTS_COLLECTION").unwrap_or_else(|| "events".to_string());

        Self {
            booking: BookingConfig {
                room: Room {
                    name: lookup("LOCALI_ROOM_NAME")
                        .unwrap_or_else(|| "Katharyn Alvord Gerlich Theater".to_string()),
                    venue: lookup("LOCALI_VENUE_NAME")
                        .unwrap_or_else(|| "Meany Hall for the Performing Arts".to_string()),
                },
                reply_delay_ms: lookup("LOCALI_REPLY_DELAY_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(800),
                default_tags: lookup("LOCALI_DEFAULT_TAGS").map_or_else(
                    || vec!["AI".to_string(), "Deep Learning".to_string(), "Workshop".to_string()],
                    |s| parse_list(&s),
                ),
                events_collection: events_collection.clone(),
            },
            catalog: CatalogConfig {
                events_collection,
                users_collection: lookup("LOCALI_USERS_COLLECTION").unwrap_or_else(|| "users".to_string()),
                recommendation_limit: lookup("LOCALI_RECOMMENDATION_LIMIT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
                upcoming_days: lookup("LOCALI_UPCOMING_DAYS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(7),
            },
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.booking.room.name, "Katharyn Alvord Gerlich Theater");
        assert_eq!(config.booking.room.venue, "Meany Hall for the Performing Arts");
        assert_eq!(config.booking.reply_delay(), Duration::from_millis(800));
        assert_eq!(config.booking.default_tags, vec!["AI", "Deep Learning", "Workshop"]);
        assert_eq!(config.catalog.events_collection, "events");
        assert_eq!(config.catalog.users_collection, "users");
        assert_eq!(config.catalog.recommendation_limit, 3);
        assert_eq!(config.catalog.upcoming_days, 7);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LOCALI_REPLY_DELAY_MS", "0"),
            ("LOCALI_DEFAULT_TAGS", " Music , ,Jazz"),
            ("LOCALI_EVENTS_COLLECTION", "staging_events"),
            ("LOCALI_RECOMMENDATION_LIMIT", "lots"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.booking.reply_delay(), Duration::ZERO);
        assert_eq!(config.booking.default_tags, vec!["Music", "Jazz"]);
        assert_eq!(config.booking.events_collection, "staging_events");
        assert_eq!(config.catalog.events_collection, "staging_events");
        assert_eq!(config.catalog.recommendation_limit, 3);
    }
}
