//! Booking conversations driven through the store runtime.

#![allow(clippy::unwrap_used)]

use locali_core::document::DocumentStoreError;
use locali_core::environment::Clock;
use locali_core::identity::Identity;
use locali_core::notification::Severity;
use locali_events::booking::{
    BookingAction, BookingEnvironment, BookingReducer, BookingStore, ConversationState, Role, Route,
};
use locali_events::{BookingError, Config, EventRecord};
use locali_testing::helpers::send_and_settle;
use locali_testing::{InMemoryDocumentStore, RecordingNotifier, StaticSession, test_clock};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    store: BookingStore,
    documents: InMemoryDocumentStore,
    session: Arc<StaticSession>,
    notifier: Arc<RecordingNotifier>,
}

fn harness_with_delay(delay_ms: u64) -> Harness {
    let delay = delay_ms.to_string();
    let config = Config::from_lookup(|key| (key == "LOCALI_REPLY_DELAY_MS").then(|| delay.clone()));
    let documents = InMemoryDocumentStore::new();
    let session = Arc::new(StaticSession::signed_in(
        Identity::new("host-1")
            .with_display_name("Ada Lovelace")
            .with_photo_url("https://example.test/ada.png"),
    ));
    let notifier = Arc::new(RecordingNotifier::new());

    let environment = BookingEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(documents.clone()),
        session.clone(),
        notifier.clone(),
        config.booking,
    );

    Harness {
        store: BookingStore::new(ConversationState::new(), BookingReducer::new(), environment),
        documents,
        session,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with_delay(0)
}

async fn answer_all(harness: &Harness, answers: &[&str]) {
    for answer in answers {
        send_and_settle(&harness.store, BookingAction::submit(*answer)).await.unwrap();
    }
}

const AI_WORKSHOP: [&str; 5] = ["3/15/2025", "10:00am-12:00pm", "25", "AI Workshop", "yes"];

#[tokio::test]
async fn full_conversation_creates_event() {
    let h = harness();
    answer_all(&h, &AI_WORKSHOP).await;

    let step = h.store.state(|s| s.step_number()).await;
    assert_eq!(step, 6);

    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();

    let documents = h.documents.documents("events");
    assert_eq!(documents.len(), 1);
    let record: EventRecord = documents[0].decode().unwrap();

    assert_eq!(record.title, "AI Workshop");
    assert_eq!(record.date, "2025-03-15");
    assert_eq!(record.time, "10:00 AM-12:00 PM");
    assert_eq!(record.start_time, "10:00 AM");
    assert_eq!(record.end_time, "12:00 PM");
    assert_eq!(record.capacity, 25);
    assert_eq!(record.attendee_count, 0);
    assert!(record.description.starts_with("Suggested content for AI Workshop:"));
    assert!(record.description.contains("Introduction to Deep Learning"));
    assert_eq!(record.host_id.as_str(), "host-1");
    assert_eq!(record.host_name, "Ada Lovelace");
    assert!(record.is_public);
    assert!(record.requires_registration);
    assert_eq!(record.created_at, Some(test_clock().now()));

    let raw = &documents[0].data;
    assert_eq!(raw["hostPhotoURL"], "https://example.test/ada.png");
    assert_eq!(raw["attendeeCount"], 0);

    let (route, saved, saving) = h
        .store
        .state(|s| (s.route.clone(), s.saved_event.clone(), s.saving))
        .await;
    assert!(!saving);
    assert_eq!(saved.as_ref(), Some(&documents[0].id));
    assert_eq!(route.unwrap().path(), format!("/events/{}", documents[0].id));

    let toast = h.notifier.last().unwrap();
    assert_eq!(toast.title, "Event Created");
    assert_eq!(toast.severity, Severity::Info);
}

#[tokio::test]
async fn transcript_alternates_user_and_assistant() {
    let h = harness();
    answer_all(&h, &["not a date", "3/15/2025"]).await;

    let transcript: Vec<(Role, String)> = h
        .store
        .state(|s| s.messages.iter().map(|m| (m.role, m.content.clone())).collect())
        .await;

    assert_eq!(transcript.len(), 5);
    assert_eq!(transcript[1], (Role::User, "not a date".to_string()));
    assert_eq!(
        transcript[2],
        (Role::Assistant, "Please enter a valid date in M/D/YYYY format.".to_string())
    );
    assert!(transcript[4].1.starts_with("Great! I've noted the date: 3/15/2025."));
}

#[tokio::test]
async fn declined_content_stores_placeholder() {
    let h = harness();
    answer_all(&h, &["4/2/2025", "2-4pm", "12", "Pottery Night", "no thanks"]).await;
    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();

    let record: EventRecord = h.documents.documents("events")[0].decode().unwrap();
    assert_eq!(record.description, "No description provided");
    assert_eq!(record.location, "Katharyn Alvord Gerlich Theater, Room 12");
}

#[tokio::test]
async fn continue_before_final_step_does_not_write() {
    let h = harness();
    answer_all(&h, &["3/15/2025", "10-11"]).await;

    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();

    assert_eq!(h.documents.create_count(), 0);
    let error = h.store.state(|s| s.last_error.clone()).await;
    assert_eq!(error, Some(BookingError::NotReady { step: 3 }));
}

#[tokio::test]
async fn signed_out_host_is_sent_to_sign_in() {
    let h = harness();
    h.session.sign_out();
    answer_all(&h, &AI_WORKSHOP).await;

    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();

    assert_eq!(h.documents.create_count(), 0);
    let (route, error) = h.store.state(|s| (s.route.clone(), s.last_error.clone())).await;
    assert_eq!(route, Some(Route::SignIn));
    assert_eq!(route.unwrap().path(), "/auth/signin");
    assert_eq!(error, Some(BookingError::AuthRequired));

    let toast = h.notifier.last().unwrap();
    assert_eq!(toast.title, "Authentication Required");
    assert_eq!(toast.description, "Please sign in to create an event.");
    assert_eq!(toast.severity, Severity::Destructive);
}

#[tokio::test]
async fn failed_write_can_be_retried() {
    let h = harness();
    answer_all(&h, &AI_WORKSHOP).await;

    h.documents.fail_writes(Some("quota exceeded"));
    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();

    let (step, saving, error) = h
        .store
        .state(|s| (s.step_number(), s.saving, s.last_error.clone()))
        .await;
    assert_eq!(step, 6);
    assert!(!saving);
    assert!(matches!(
        error,
        Some(BookingError::Persistence(DocumentStoreError::WriteFailed { .. }))
    ));
    assert_eq!(h.documents.len("events"), 0);
    assert_eq!(h.notifier.last().unwrap().description, "Failed to create your event. Please try again.");

    h.documents.fail_writes(None);
    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();

    assert_eq!(h.documents.len("events"), 1);
    let error = h.store.state(|s| s.last_error.clone()).await;
    assert!(error.is_none());
}

#[tokio::test]
async fn repeated_continue_while_saving_writes_once() {
    let h = harness();
    answer_all(&h, &AI_WORKSHOP).await;
    h.documents.delay_writes(Duration::from_millis(100));

    let mut first = h.store.send(BookingAction::Continue).await.unwrap();
    let mut second = h.store.send(BookingAction::Continue).await.unwrap();
    first.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
    second.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    assert_eq!(h.documents.create_count(), 1);
    assert_eq!(h.documents.len("events"), 1);
}

#[tokio::test]
async fn submissions_during_reply_delay_are_dropped() {
    let h = harness_with_delay(50);

    let mut pending = h.store.send(BookingAction::submit("3/15/2025")).await.unwrap();
    let mut ignored = h.store.send(BookingAction::submit("10-11")).await.unwrap();
    pending.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
    ignored.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let (step, messages) = h.store.state(|s| (s.step_number(), s.messages.len())).await;
    assert_eq!(step, 2);
    // welcome, the accepted submission, and its reply
    assert_eq!(messages, 3);
}

#[tokio::test]
async fn blank_submission_adds_nothing() {
    let h = harness();
    send_and_settle(&h.store, BookingAction::submit("  ")).await.unwrap();

    let (step, messages, awaiting) = h
        .store
        .state(|s| (s.step_number(), s.messages.len(), s.awaiting_reply))
        .await;
    assert_eq!(step, 1);
    assert_eq!(messages, 1);
    assert!(!awaiting);
}

#[tokio::test]
async fn continue_after_creation_writes_nothing_more() {
    let h = harness();
    answer_all(&h, &AI_WORKSHOP).await;

    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();
    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();

    assert_eq!(h.documents.create_count(), 1);
    assert_eq!(h.documents.len("events"), 1);
    let toasts = h.notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Event Created");
}

#[tokio::test]
async fn early_continue_error_clears_on_next_answer() {
    let h = harness();
    send_and_settle(&h.store, BookingAction::Continue).await.unwrap();
    let error = h.store.state(|s| s.last_error.clone()).await;
    assert_eq!(error, Some(BookingError::NotReady { step: 1 }));

    answer_all(&h, &["3/15/2025", "10-11"]).await;

    let (step, error) = h.store.state(|s| (s.step_number(), s.last_error.clone())).await;
    assert_eq!(step, 3);
    assert!(error.is_none());
}
