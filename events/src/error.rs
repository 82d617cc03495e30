//! Error types for the events core.

use locali_core::document::DocumentStoreError;
use thiserror::Error;

/// A booking answer that failed validation.
///
/// Never fatal: the conversation re-prompts at the same step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Not in `M/D/YYYY` shape
    #[error("'{0}' is not a date in M/D/YYYY format")]
    Date(String),

    /// Missing a `-` separator or too short
    #[error("'{0}' is not a time slot")]
    TimeSlot(String),

    /// Not a finite number greater than zero
    #[error("'{0}' is not a positive capacity")]
    Capacity(String),
}

/// Errors surfaced when finalizing a booking.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    /// Nobody is signed in
    #[error("Sign-in required to create an event")]
    AuthRequired,

    /// The conversation has not reached its final step
    #[error("Booking is not ready to finalize (step {step} of 6)")]
    NotReady {
        /// Current step number
        step: u8,
    },

    /// The collected date has no calendar representation
    #[error("Booking date '{0}' cannot be represented as a calendar date")]
    InvalidDate(String),

    /// The document store rejected the event
    #[error(transparent)]
    Persistence(#[from] DocumentStoreError),
}
