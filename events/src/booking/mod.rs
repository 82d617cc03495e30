//! Conversational room booking.
//!
//! A conversation walks through six steps (date, time slot, capacity,
//! event name, content offer, finalized). Each submission is answered after
//! a short delay. At the final step `Continue` writes the event to the
//! document store under the signed-in host.

pub mod content;
pub mod finalize;
pub mod message;
pub mod reducer;
pub mod step;

pub use content::{Outline, suggest_content};
pub use finalize::build_record;
pub use message::{Message, MessageId, Role};
pub use reducer::{BookingAction, BookingEnvironment, BookingReducer, ConversationState, Route};
pub use step::{BookingDate, BookingDraft, BookingStep, Capacity, TimeSlot, WELCOME};

/// A running booking conversation.
pub type BookingStore =
    locali_runtime::Store<ConversationState, BookingAction, BookingEnvironment, BookingReducer>;
