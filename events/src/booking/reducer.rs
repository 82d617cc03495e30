//! Reducer for one booking conversation.

use super::finalize::build_record;
use super::message::Message;
use super::step::{BookingStep, WELCOME};
use crate::config::BookingConfig;
use crate::error::BookingError;
use locali_core::document::{DocumentId, DocumentStore, DocumentStoreError};
use locali_core::effect::Effect;
use locali_core::environment::Clock;
use locali_core::identity::SessionProvider;
use locali_core::notification::{Notifier, Toast};
use locali_core::reducer::Reducer;
use smallvec::{SmallVec, smallvec};
use std::fmt;
use std::sync::Arc;

/// Where the view should navigate after finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Sign-in page
    SignIn,
    /// Detail page of a created event
    EventDetail(DocumentId),
}

impl Route {
    /// Path of the route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::SignIn => "/auth/signin".to_string(),
            Self::EventDetail(id) => format!("/events/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// State of one booking conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    /// Current step and the answers collected so far
    pub step: BookingStep,
    /// Transcript, oldest first
    pub messages: Vec<Message>,
    /// A submission is waiting for the assistant's reply
    pub awaiting_reply: bool,
    /// The event is being written to the store
    pub saving: bool,
    /// Outcome of the last failed finalization, until the next processed answer
    pub last_error: Option<BookingError>,
    /// Navigation requested by finalization
    pub route: Option<Route>,
    /// Identifier of the created event
    pub saved_event: Option<DocumentId>,
}

impl ConversationState {
    /// A fresh conversation opened with the welcome message.
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: BookingStep::DateEntry,
            messages: vec![Message::assistant(WELCOME)],
            awaiting_reply: false,
            saving: false,
            last_error: None,
            route: None,
            saved_event: None,
        }
    }

    /// Current step number, 1 through 6.
    #[must_use]
    pub const fn step_number(&self) -> u8 {
        self.step.number()
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions of a booking conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    /// The user submitted an answer
    Submit {
        /// Text as typed
        text: String,
    },
    /// The reply delay elapsed; evaluate the answer
    ProcessAnswer {
        /// Text as typed
        text: String,
    },
    /// The user asked to create the event
    Continue,
    /// The store accepted the event
    EventSaved {
        /// Store-assigned identifier
        id: DocumentId,
    },
    /// Creating the event failed
    SaveFailed {
        /// Why
        error: BookingError,
    },
}

impl BookingAction {
    /// A user submission.
    #[must_use]
    pub fn submit(text: impl Into<String>) -> Self {
        Self::Submit { text: text.into() }
    }
}

/// Collaborators of the booking reducer.
#[derive(Clone)]
pub struct BookingEnvironment {
    clock: Arc<dyn Clock>,
    store: Arc<dyn DocumentStore>,
    session: Arc<dyn SessionProvider>,
    notifier: Arc<dyn Notifier>,
    config: BookingConfig,
}

impl BookingEnvironment {
    /// Create an environment.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        store: Arc<dyn DocumentStore>,
        session: Arc<dyn SessionProvider>,
        notifier: Arc<dyn Notifier>,
        config: BookingConfig,
    ) -> Self {
        Self {
            clock,
            store,
            session,
            notifier,
            config,
        }
    }

    /// Booking configuration.
    #[must_use]
    pub const fn config(&self) -> &BookingConfig {
        &self.config
    }

    fn notify(&self, toast: Toast) -> Effect<BookingAction> {
        let notifier = Arc::clone(&self.notifier);
        Effect::fire_and_forget(async move { notifier.notify(toast) })
    }
}

impl fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Reducer driving the booking conversation.
///
/// Submissions are answered after the configured reply delay, one at a
/// time. `Continue` at the final step writes the event to the store;
/// failures leave the collected answers in place so `Continue` can be
/// retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn finalize(
        state: &mut ConversationState,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if state.saving {
            tracing::warn!("Ignoring continue while the event is being saved");
            return SmallVec::new();
        }
        if let Some(id) = &state.saved_event {
            tracing::warn!(event_id = %id, "Ignoring continue after the event was created");
            return SmallVec::new();
        }

        let Some(draft) = state.step.draft() else {
            let step = state.step.number();
            tracing::warn!(step, "Continue before the booking is complete");
            state.last_error = Some(BookingError::NotReady { step });
            return SmallVec::new();
        };

        let Some(host) = env.session.current_user() else {
            tracing::warn!("Sign-in required to create an event");
            state.last_error = Some(BookingError::AuthRequired);
            state.route = Some(Route::SignIn);
            return smallvec![env.notify(Toast::destructive(
                "Authentication Required",
                "Please sign in to create an event.",
            ))];
        };

        let body = build_record(draft, &host, &env.config, env.clock.now()).and_then(|record| {
            serde_json::to_value(&record).map_err(|e| BookingError::from(DocumentStoreError::Encode(e.to_string())))
        });
        let body = match body {
            Ok(body) => body,
            Err(error) => return Self::save_failed(state, env, error),
        };

        state.saving = true;
        state.last_error = None;
        tracing::debug!(host = %host.uid, "Saving event");

        let store = Arc::clone(&env.store);
        let collection = env.config.events_collection.clone();
        smallvec![Effect::Future(Box::pin(async move {
            match store.create(&collection, body).await {
                Ok(id) => Some(BookingAction::EventSaved { id }),
                Err(error) => Some(BookingAction::SaveFailed { error: error.into() }),
            }
        }))]
    }

    fn save_failed(
        state: &mut ConversationState,
        env: &BookingEnvironment,
        error: BookingError,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        tracing::error!(%error, "Error creating event");
        state.saving = false;
        state.last_error = Some(error);
        smallvec![env.notify(Toast::destructive(
            "Error",
            "Failed to create your event. Please try again.",
        ))]
    }
}

impl Reducer for BookingReducer {
    type State = ConversationState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::Submit { text } => {
                if text.trim().is_empty() {
                    return SmallVec::new();
                }
                if state.awaiting_reply {
                    tracing::warn!("Ignoring submission while a reply is pending");
                    return SmallVec::new();
                }

                state.messages.push(Message::user(text.clone()));
                state.awaiting_reply = true;

                smallvec![Effect::Delay {
                    duration: env.config.reply_delay(),
                    action: Box::new(BookingAction::ProcessAnswer { text }),
                }]
            },

            BookingAction::ProcessAnswer { text } => {
                let from = state.step.number();
                let (next, reply) = std::mem::take(&mut state.step).answer(&text, &env.config.room);
                state.step = next;
                state.awaiting_reply = false;
                state.last_error = None;
                state.messages.push(Message::assistant(reply));

                tracing::debug!(from, to = state.step.number(), "Processed booking answer");
                SmallVec::new()
            },

            BookingAction::Continue => Self::finalize(state, env),

            BookingAction::EventSaved { id } => {
                tracing::info!(event_id = %id, "Event created");
                state.saving = false;
                state.last_error = None;
                state.route = Some(Route::EventDetail(id.clone()));
                state.saved_event = Some(id);

                smallvec![env.notify(Toast::info(
                    "Event Created",
                    "Your event has been created successfully!",
                ))]
            },

            BookingAction::SaveFailed { error } => Self::save_failed(state, env, error),
        }
    }
}
