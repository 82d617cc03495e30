//! The booking conversation as a sequence of typed steps.
//!
//! Each step carries exactly the answers collected before it, so a later
//! field can never be read early. [`BookingStep::answer`] consumes the
//! current step and returns the next one together with the assistant's
//! reply. An invalid answer returns the same step with a re-prompt.

use super::content::suggest_content;
use crate::error::ValidationError;
use crate::types::Room;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // literal pattern
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}$").expect("date pattern is valid"));

/// A date answer in `M/D/YYYY` shape.
///
/// Only the shape is checked: `13/45/2024` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDate(String);

impl BookingDate {
    /// Validate a date answer. The input is not trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Date`] if the input is not `digits/digits/digits`
    /// with 1-2, 1-2 and 4 digits.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if DATE_PATTERN.is_match(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(ValidationError::Date(input.to_string()))
        }
    }

    /// The date as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Month, day and year as entered.
    #[must_use]
    pub fn parts(&self) -> (u32, u32, u32) {
        let mut numbers = self.0.split('/').map(|part| part.parse::<u32>().unwrap_or(0));
        let month = numbers.next().unwrap_or(0);
        let day = numbers.next().unwrap_or(0);
        let year = numbers.next().unwrap_or(0);
        (month, day, year)
    }
}

impl fmt::Display for BookingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A time slot answer such as `10:00 AM - 12:00 PM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot(String);

impl TimeSlot {
    /// Validate and normalise a time slot answer.
    ///
    /// The answer must contain `-` and be longer than three characters.
    /// When it contains a lowercase `am` or `pm`, the first `am` and the first
    /// `pm` (in any case) are rewritten as ` AM` and ` PM`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TimeSlot`] if the shape check fails.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if !input.contains('-') || input.chars().count() <= 3 {
            return Err(ValidationError::TimeSlot(input.to_string()));
        }

        if input.contains("am") || input.contains("pm") {
            let formatted = replace_first_ignore_case(input, "am", " AM");
            Ok(Self(replace_first_ignore_case(&formatted, "pm", " PM")))
        } else {
            Ok(Self(input.to_string()))
        }
    }

    /// The normalised slot.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Start and end, split on the first `-` and trimmed.
    #[must_use]
    pub fn bounds(&self) -> (&str, &str) {
        match self.0.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (self.0.trim(), ""),
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn replace_first_ignore_case(haystack: &str, needle: &str, replacement: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with the input
    match haystack.to_ascii_lowercase().find(needle) {
        Some(at) => format!("{}{}{}", &haystack[..at], replacement, &haystack[at + needle.len()..]),
        None => haystack.to_string(),
    }
}

/// A positive room capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity(u32);

impl Capacity {
    /// Validate a capacity answer.
    ///
    /// Surrounding whitespace is ignored. Any finite number greater than zero
    /// is accepted, including `0x`, `0b` and `0o` integer literals; fractions
    /// are rounded up.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Capacity`] if the answer is not a finite
    /// number in `(0, u32::MAX]`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::Capacity(input.to_string());
        let text = input.trim();
        let value = match radix_prefix(text) {
            Some((radix, digits)) => {
                // from_str_radix alone would also take a leading sign
                if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                    return Err(invalid());
                }
                u32::from_str_radix(digits, radix).map(f64::from).map_err(|_| invalid())?
            },
            None => text.parse::<f64>().map_err(|_| invalid())?,
        };

        if !value.is_finite() || value <= 0.0 || value > f64::from(u32::MAX) {
            return Err(invalid());
        }

        // In range and positive after the checks above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let people = value.ceil() as u32;
        Ok(Self(people))
    }

    /// The capacity as a number of people.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Radix and digits of a `0x`, `0b` or `0o` integer literal.
fn radix_prefix(text: &str) -> Option<(u32, &str)> {
    let radix = match text.get(..2)?.to_ascii_lowercase().as_str() {
        "0x" => 16,
        "0b" => 2,
        "0o" => 8,
        _ => return None,
    };
    Some((radix, &text[2..]))
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything collected by a completed conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    /// Requested date
    pub date: BookingDate,
    /// Requested time slot
    pub time_slot: TimeSlot,
    /// Required capacity
    pub capacity: Capacity,
    /// Event name as entered
    pub name: String,
    /// Generated agenda, if the user accepted one
    pub content: Option<String>,
}

/// Where the booking conversation stands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookingStep {
    /// Step 1: waiting for a date
    #[default]
    DateEntry,
    /// Step 2: waiting for a time slot
    TimeEntry {
        /// Accepted date
        date: BookingDate,
    },
    /// Step 3: waiting for a capacity
    CapacityEntry {
        /// Accepted date
        date: BookingDate,
        /// Accepted time slot
        time_slot: TimeSlot,
    },
    /// Step 4: waiting for the event name
    NameEntry {
        /// Accepted date
        date: BookingDate,
        /// Accepted time slot
        time_slot: TimeSlot,
        /// Accepted capacity
        capacity: Capacity,
    },
    /// Step 5: waiting for a yes/no on generated content
    ContentOffer {
        /// Accepted date
        date: BookingDate,
        /// Accepted time slot
        time_slot: TimeSlot,
        /// Accepted capacity
        capacity: Capacity,
        /// Event name
        name: String,
    },
    /// Step 6: everything collected
    Finalized(BookingDraft),
}

/// First assistant message of every conversation.
pub const WELCOME: &str = "Welcome to the Locali AI Event Creation System! What date would you like to book a room? (Please enter in M/D/YYYY format)";

const DATE_REPROMPT: &str = "Please enter a valid date in M/D/YYYY format.";
const TIME_REPROMPT: &str = "Please enter a valid time slot format (e.g., 10:00 AM - 12:00 PM).";
const CAPACITY_REPROMPT: &str = "Please enter a valid capacity (a positive number).";
const CONTENT_DECLINED: &str =
    "No problem! Your event has been created. Would you like to add any additional details or make any changes?";
const FINALIZED: &str =
    "Your booking has been finalized. Click 'Continue to Event Details' to complete the process.";

impl BookingStep {
    /// Step number, 1 through 6.
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::DateEntry => 1,
            Self::TimeEntry { .. } => 2,
            Self::CapacityEntry { .. } => 3,
            Self::NameEntry { .. } => 4,
            Self::ContentOffer { .. } => 5,
            Self::Finalized(_) => 6,
        }
    }

    /// Whether every field has been collected.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized(_))
    }

    /// The completed draft, at step 6.
    #[must_use]
    pub const fn draft(&self) -> Option<&BookingDraft> {
        match self {
            Self::Finalized(draft) => Some(draft),
            _ => None,
        }
    }

    /// The accepted date, from step 2 on.
    #[must_use]
    pub const fn date(&self) -> Option<&BookingDate> {
        match self {
            Self::DateEntry => None,
            Self::TimeEntry { date }
            | Self::CapacityEntry { date, .. }
            | Self::NameEntry { date, .. }
            | Self::ContentOffer { date, .. }
            | Self::Finalized(BookingDraft { date, .. }) => Some(date),
        }
    }

    /// The accepted capacity, from step 4 on.
    #[must_use]
    pub const fn capacity(&self) -> Option<Capacity> {
        match self {
            Self::NameEntry { capacity, .. }
            | Self::ContentOffer { capacity, .. }
            | Self::Finalized(BookingDraft { capacity, .. }) => Some(*capacity),
            _ => None,
        }
    }

    /// Evaluate one answer against this step.
    ///
    /// Returns the next step and the assistant's reply. Invalid answers at
    /// steps 1-3 return the unchanged step with a re-prompt; steps 4-6 accept
    /// anything.
    #[must_use]
    pub fn answer(self, input: &str, room: &Room) -> (Self, String) {
        match self {
            Self::DateEntry => match BookingDate::parse(input) {
                Ok(date) => {
                    let reply = format!(
                        "Great! I've noted the date: {date}. Now, please enter the time slot (e.g., 10:00 AM - 12:00 PM or 11:00am-12:00pm):"
                    );
                    (Self::TimeEntry { date }, reply)
                },
                Err(_) => (Self::DateEntry, DATE_REPROMPT.to_string()),
            },
            Self::TimeEntry { date } => match TimeSlot::parse(input) {
                Ok(time_slot) => {
                    let reply = format!(
                        "Got it! Time slot: {time_slot}. Now, what is your required room capacity (number of people)?"
                    );
                    (Self::CapacityEntry { date, time_slot }, reply)
                },
                Err(_) => (Self::TimeEntry { date }, TIME_REPROMPT.to_string()),
            },
            Self::CapacityEntry { date, time_slot } => match Capacity::parse(input) {
                Ok(capacity) => {
                    let reply = format!(
                        "Room {} in {} has been successfully booked!\n\nWhat is the name of your event?",
                        room.name, room.venue
                    );
                    (
                        Self::NameEntry {
                            date,
                            time_slot,
                            capacity,
                        },
                        reply,
                    )
                },
                Err(_) => (Self::CapacityEntry { date, time_slot }, CAPACITY_REPROMPT.to_string()),
            },
            Self::NameEntry {
                date,
                time_slot,
                capacity,
            } => {
                let reply =
                    format!("Would you like me to generate a suggested content agenda for your {input} event?");
                (
                    Self::ContentOffer {
                        date,
                        time_slot,
                        capacity,
                        name: input.to_string(),
                    },
                    reply,
                )
            },
            Self::ContentOffer {
                date,
                time_slot,
                capacity,
                name,
            } => {
                let (content, reply) = if is_affirmative(input) {
                    let content = suggest_content(&name);
                    (Some(content.clone()), content)
                } else {
                    (None, CONTENT_DECLINED.to_string())
                };
                let draft = BookingDraft {
                    date,
                    time_slot,
                    capacity,
                    name,
                    content,
                };
                (Self::Finalized(draft), reply)
            },
            Self::Finalized(draft) => (Self::Finalized(draft), FINALIZED.to_string()),
        }
    }
}

fn is_affirmative(input: &str) -> bool {
    let input = input.to_lowercase();
    ["yes", "sure", "ok"].iter().any(|word| input.contains(word))
}
