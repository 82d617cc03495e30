//! # Locali Testing
//!
//! Testing utilities for Locali reducers and the collaborators they depend on.
//!
//! This crate provides:
//! - Deterministic clocks
//! - An in-memory document store with failure injection
//! - Scriptable session and notification collaborators
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use locali_testing::{InMemoryDocumentStore, RecordingNotifier, StaticSession, test_clock};
//! use locali_runtime::Store;
//!
//! #[tokio::test]
//! async fn booking_flow() {
//!     let env = BookingEnvironment::new(
//!         Arc::new(test_clock()),
//!         Arc::new(InMemoryDocumentStore::new()),
//!         Arc::new(StaticSession::signed_in(Identity::new("u1"))),
//!         Arc::new(RecordingNotifier::new()),
//!         config.booking,
//!     );
//!     let store = Store::new(ConversationState::new(), BookingReducer, env);
//!
//!     locali_testing::helpers::send_and_settle(&store, BookingAction::submit("5/20/2025")).await?;
//! }
//! ```

use chrono::{DateTime, Utc};
use locali_core::environment::Clock;

mod document_mocks;
pub mod reducer_test;

pub use document_mocks::InMemoryDocumentStore;
pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment collaborators.
pub mod mocks {
    #![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity

    use super::{Clock, DateTime, Utc};
    use locali_core::identity::{Identity, SessionProvider};
    use locali_core::notification::{Notifier, Toast};
    use std::sync::{Mutex, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use locali_testing::mocks::FixedClock;
    /// use locali_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-05-14 09:30:00 UTC, a Wednesday)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-05-14T09:30:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Session provider whose signed-in user is set by the test.
    #[derive(Debug, Default)]
    pub struct StaticSession {
        user: RwLock<Option<Identity>>,
    }

    impl StaticSession {
        /// A session with `identity` signed in.
        #[must_use]
        pub fn signed_in(identity: Identity) -> Self {
            Self {
                user: RwLock::new(Some(identity)),
            }
        }

        /// A session with nobody signed in.
        #[must_use]
        pub fn signed_out() -> Self {
            Self::default()
        }

        /// Sign `identity` in, replacing any current user.
        pub fn sign_in(&self, identity: Identity) {
            *self.user.write().unwrap() = Some(identity);
        }

        /// Sign the current user out.
        pub fn sign_out(&self) {
            *self.user.write().unwrap() = None;
        }
    }

    impl SessionProvider for StaticSession {
        fn current_user(&self) -> Option<Identity> {
            self.user.read().unwrap().clone()
        }
    }

    /// Notifier that records every toast for later assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        toasts: Mutex<Vec<Toast>>,
    }

    impl RecordingNotifier {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// All toasts shown so far, oldest first.
        #[must_use]
        pub fn toasts(&self) -> Vec<Toast> {
            self.toasts.lock().unwrap().clone()
        }

        /// The most recent toast.
        #[must_use]
        pub fn last(&self) -> Option<Toast> {
            self.toasts.lock().unwrap().last().cloned()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, toast: Toast) {
            self.toasts.lock().unwrap().push(toast);
        }
    }
}

/// Helpers for driving a [`locali_runtime::Store`] in async tests.
pub mod helpers {
    use locali_core::reducer::Reducer;
    use locali_runtime::{Store, StoreError};
    use std::time::Duration;

    /// Upper bound on how long a test waits for an effect cascade.
    pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Send `action` and wait until every effect it caused has finished.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the action is rejected, or
    /// [`StoreError::Timeout`] if effects are still running after
    /// [`SETTLE_TIMEOUT`].
    pub async fn send_and_settle<S, A, E, R>(
        store: &Store<S, A, E, R>,
        action: A,
    ) -> Result<(), StoreError>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        let mut handle = store.send(action).await?;
        handle.wait_with_timeout(SETTLE_TIMEOUT).await
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, RecordingNotifier, StaticSession, test_clock};
