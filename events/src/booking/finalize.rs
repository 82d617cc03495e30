//! Turning a completed conversation into an event record.

use super::step::{BookingDate, BookingDraft};
use crate::config::BookingConfig;
use crate::error::BookingError;
use crate::types::EventRecord;
use chrono::{DateTime, Days, NaiveDate, Utc};
use locali_core::identity::Identity;

/// Description stored when the user declined generated content.
pub const NO_DESCRIPTION: &str = "No description provided";

/// Host name stored when the identity carries no name.
pub const DEFAULT_HOST_NAME: &str = "Event Host";

/// Resolve an `M/D/YYYY` answer to a calendar date.
///
/// Out-of-range parts roll over the way calendar arithmetic does: month 13
/// is January of the next year, day 0 is the last day of the previous month.
/// Years 0 through 99 mean 1900 through 1999.
///
/// # Errors
///
/// Returns [`BookingError::InvalidDate`] if the result is outside the
/// supported calendar range.
pub fn calendar_date(date: &BookingDate) -> Result<NaiveDate, BookingError> {
    let invalid = || BookingError::InvalidDate(date.to_string());
    let (month, day, year) = date.parts();

    let year = if year <= 99 { 1900 + year } else { year };
    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let first = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).map_err(|_| invalid())?,
        u32::try_from(months.rem_euclid(12) + 1).map_err(|_| invalid())?,
        1,
    )
    .ok_or_else(invalid)?;

    let offset = i64::from(day) - 1;
    let shifted = if offset >= 0 {
        first.checked_add_days(Days::new(offset.unsigned_abs()))
    } else {
        first.checked_sub_days(Days::new(offset.unsigned_abs()))
    };
    shifted.ok_or_else(invalid)
}

/// Build the event record for a completed booking.
///
/// # Errors
///
/// Returns [`BookingError::InvalidDate`] if the booking date cannot be resolved.
pub fn build_record(
    draft: &BookingDraft,
    host: &Identity,
    config: &BookingConfig,
    now: DateTime<Utc>,
) -> Result<EventRecord, BookingError> {
    let date = calendar_date(&draft.date)?;
    let (start, end) = draft.time_slot.bounds();

    Ok(EventRecord {
        title: draft.name.clone(),
        description: draft
            .content
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        date: date.format("%Y-%m-%d").to_string(),
        time: draft.time_slot.as_str().to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        location: format!("{}, Room {}", config.room.name, draft.capacity),
        capacity: draft.capacity.get(),
        attendee_count: 0,
        tags: config.default_tags.clone(),
        host_id: host.uid.clone(),
        host_name: host.preferred_name().unwrap_or(DEFAULT_HOST_NAME).to_string(),
        host_photo_url: host.photo_url.clone().unwrap_or_default(),
        is_public: true,
        requires_registration: true,
        featured: false,
        created_at: Some(now),
        updated_at: Some(now),
    })
}
