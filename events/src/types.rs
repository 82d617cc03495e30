//! Domain types for events and user profiles.
//!
//! Documents come from a schemaless store, so every field of a stored event
//! is optional on read and falls back to an empty value.

use chrono::{DateTime, NaiveDate, Utc};
use locali_core::document::{Document, DocumentId, DocumentStoreError};
use locali_core::identity::UserId;
use serde::{Deserialize, Serialize};

/// The bookable room offered by the booking conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room name, also used in the event location
    pub name: String,
    /// Building the room belongs to
    pub venue: String,
}

/// Body of an event document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRecord {
    /// Event title
    pub title: String,
    /// Free-text description (the agenda for generated events)
    pub description: String,
    /// Calendar date as `YYYY-MM-DD`
    pub date: String,
    /// Raw time slot as entered
    pub time: String,
    /// Start of the time slot
    pub start_time: String,
    /// End of the time slot
    pub end_time: String,
    /// Human-readable location
    pub location: String,
    /// Maximum number of attendees
    pub capacity: u32,
    /// Current number of attendees
    pub attendee_count: u32,
    /// Topic tags
    pub tags: Vec<String>,
    /// Creator's user id
    pub host_id: UserId,
    /// Creator's display name
    pub host_name: String,
    /// Creator's avatar reference
    #[serde(rename = "hostPhotoURL")]
    pub host_photo_url: String,
    /// Listed publicly
    pub is_public: bool,
    /// Attendees must register
    pub requires_registration: bool,
    /// Highlighted on featured lists
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub featured: bool,
    /// Creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EventRecord {
    /// The event's calendar date.
    ///
    /// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps; `None` if the
    /// stored value is neither.
    #[must_use]
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&self.date).ok().map(|dt| dt.date_naive()))
    }
}

/// A stored event: store-assigned id plus body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier
    pub id: DocumentId,
    /// Event body
    #[serde(flatten)]
    pub record: EventRecord,
}

impl Event {
    /// Decode an event document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Decode`] if a present field has the wrong type.
    pub fn from_document(document: &Document) -> Result<Self, DocumentStoreError> {
        Ok(Self {
            id: document.id.clone(),
            record: document.decode()?,
        })
    }

    /// The event's tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.record.tags
    }
}

/// A user's profile as read by listing views.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Interest tags chosen by the user
    pub interests: Vec<String>,
    /// Name shown on the profile
    pub display_name: Option<String>,
}
