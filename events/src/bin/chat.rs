//! Interactive booking conversation on the terminal.
//!
//! Runs one booking conversation against an in-memory document store seeded
//! with a few events and a signed-in demo user. Type answers at the prompt;
//! `/continue` creates the event once the conversation is finalized and
//! `/quit` exits.
//!
//! # Usage
//!
//! ```bash
//! LOCALI_REPLY_DELAY_MS=200 cargo run --bin locali-chat
//! ```

use chrono::Days;
use locali_core::environment::{Clock, SystemClock};
use locali_core::identity::{Identity, SessionProvider};
use locali_core::notification::{Notifier, Severity, Toast};
use locali_events::booking::{
    BookingAction, BookingEnvironment, BookingReducer, BookingStore, ConversationState, Role,
};
use locali_events::{Config, EventCatalog, FeedOptions};
use locali_testing::{InMemoryDocumentStore, StaticSession};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_USER: &str = "demo-user";

/// Prints toasts to stdout.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        let marker = match toast.severity {
            Severity::Info => "*",
            Severity::Destructive => "!",
        };
        println!("[{marker}] {}: {}", toast.title, toast.description);
    }
}

fn seed(store: &InMemoryDocumentStore, config: &Config, clock: &dyn Clock) {
    let today = clock.now().date_naive();
    let day = |offset: u64| {
        today
            .checked_add_days(Days::new(offset))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string()
    };

    let events = &config.catalog.events_collection;
    store.insert(
        events,
        "welcome-mixer",
        json!({ "title": "Welcome Mixer", "date": day(1), "location": "HUB Lyceum", "tags": ["Social"], "featured": true }),
    );
    store.insert(
        events,
        "intro-ml",
        json!({ "title": "Intro to Machine Learning", "date": day(3), "location": "Online", "tags": ["AI", "Machine Learning"] }),
    );
    store.insert(
        events,
        "jazz-night",
        json!({ "title": "Jazz Night", "date": day(12), "location": "Meany Hall", "tags": ["Music"] }),
    );
    store.insert(
        &config.catalog.users_collection,
        DEMO_USER,
        json!({ "displayName": "Demo User", "interests": ["ai", "deep learning", "workshop"] }),
    );
}

fn print_new_messages(state: &ConversationState, shown: &mut usize) {
    for message in state.messages.iter().skip(*shown) {
        if message.role == Role::Assistant {
            println!("\nassistant> {}\n", message.content);
        }
    }
    *shown = state.messages.len();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},locali_events=debug", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        room = %config.booking.room.name,
        reply_delay_ms = config.booking.reply_delay_ms,
        "Configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let documents = InMemoryDocumentStore::new();
    seed(&documents, &config, clock.as_ref());

    let session = StaticSession::signed_in(Identity::new(DEMO_USER).with_display_name("Demo User"));
    let session: Arc<dyn SessionProvider> = Arc::new(session);
    let environment = BookingEnvironment::new(
        Arc::clone(&clock),
        Arc::new(documents.clone()),
        Arc::clone(&session),
        Arc::new(ConsoleNotifier),
        config.booking.clone(),
    );
    let store: BookingStore = BookingStore::new(ConversationState::new(), BookingReducer::new(), environment);

    let catalog = EventCatalog::new(Arc::new(documents.clone()), Arc::clone(&clock), config.catalog.clone());
    let feed = catalog.watch(FeedOptions::upcoming(config.catalog.upcoming_days));

    let mut shown = 0;
    store.state(|state| print_new_messages(state, &mut shown)).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        let action = if command == "/quit" {
            break;
        } else if command == "/continue" {
            BookingAction::Continue
        } else {
            BookingAction::submit(line.clone())
        };

        let mut handle = store.send(action).await?;
        handle.wait().await;

        let (route, error) = store
            .state(|state| {
                print_new_messages(state, &mut shown);
                (state.route.clone(), state.last_error.clone())
            })
            .await;

        if let Some(error) = error {
            println!("({error})");
        }
        if let Some(route) = route {
            println!("-> {route}");
            break;
        }
    }

    if let Some(user) = session.current_user() {
        let picks = catalog.recommended_for(&user.uid, None).await?;
        println!("\nRecommended for {}:", user.preferred_name().unwrap_or(DEMO_USER));
        for pick in picks {
            println!("  {:>3}%  {} ({})", pick.score, pick.event.record.title, pick.event.record.date);
        }
    }

    let upcoming = feed.snapshot();
    println!("\n{} upcoming event(s) in the next {} days", upcoming.events.len(), config.catalog.upcoming_days);
    feed.close();

    store.shutdown();
    Ok(())
}
