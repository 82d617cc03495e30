//! Listing filters for the events browser.
//!
//! Filters run over an already ordered event list and never reorder it.

use crate::matching::{ScoredEvent, score_events};
use crate::types::Event;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar window relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateWindow {
    /// No date restriction
    #[default]
    Any,
    /// Today only
    Today,
    /// Today through the coming Saturday
    ThisWeek,
    /// Current calendar month
    ThisMonth,
    /// Following calendar month
    NextMonth,
}

impl DateWindow {
    /// Whether `date` falls in the window.
    #[must_use]
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::Any => true,
            Self::Today => date == today,
            Self::ThisWeek => {
                let to_saturday = 6 - u64::from(today.weekday().num_days_from_sunday());
                let end = today.checked_add_days(Days::new(to_saturday)).unwrap_or(today);
                (today..=end).contains(&date)
            },
            Self::ThisMonth => same_month(date, today),
            Self::NextMonth => today
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(1)))
                .is_some_and(|next| same_month(date, next)),
        }
    }
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Coarse location classes matched by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationKind {
    /// No location restriction
    #[default]
    Any,
    /// Mentions campus, university or uw
    OnCampus,
    /// Mentions none of campus, university, uw or virtual
    OffCampus,
    /// Mentions virtual, online or zoom
    Virtual,
}

impl LocationKind {
    /// Whether a location string falls in this class.
    #[must_use]
    pub fn matches(self, location: &str) -> bool {
        let location = location.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| location.contains(w));

        match self {
            Self::Any => true,
            Self::OnCampus => mentions(&["campus", "university", "uw"]),
            Self::OffCampus => !mentions(&["campus", "university", "uw", "virtual"]),
            Self::Virtual => mentions(&["virtual", "online", "zoom"]),
        }
    }
}

/// Filter settings of the events browser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilters {
    /// Minimum match score
    pub threshold: Option<u8>,
    /// Case-insensitive text searched in title and description
    pub search: Option<String>,
    /// Date window
    pub date: DateWindow,
    /// Location class
    pub location: LocationKind,
    /// Keep events carrying any of these tags (exact match)
    pub tags: Vec<String>,
}

impl EventFilters {
    /// Whether a scored event passes every filter.
    #[must_use]
    pub fn accepts(&self, scored: &ScoredEvent, today: NaiveDate) -> bool {
        let record = &scored.event.record;

        if self.threshold.is_some_and(|min| scored.score < min) {
            return false;
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !record.title.to_lowercase().contains(&needle)
                && !record.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if self.date != DateWindow::Any
            && !record
                .calendar_date()
                .is_some_and(|date| self.date.contains(date, today))
        {
            return false;
        }

        if !self.location.matches(&record.location) {
            return false;
        }

        self.tags.is_empty() || self.tags.iter().any(|tag| record.tags.contains(tag))
    }
}

/// Score `events` for `interests` and keep those passing `filters`, in order.
#[must_use]
pub fn apply_filters<I: AsRef<str>>(
    events: Vec<Event>,
    interests: &[I],
    filters: &EventFilters,
    today: NaiveDate,
) -> Vec<ScoredEvent> {
    score_events(events, interests)
        .into_iter()
        .filter(|scored| filters.accepts(scored, today))
        .collect()
}
