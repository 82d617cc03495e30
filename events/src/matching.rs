//! Interest/tag affinity scoring.
//!
//! The score measures how much of an *event's* focus matches the user, not
//! how many of the user's interests the event covers: the denominator is the
//! event's tag count. An event tagged only `["AI"]` scores 100 for anyone
//! interested in AI, while one tagged with ten topics and a single match
//! scores 10.

use crate::types::Event;
use std::cmp::Reverse;

/// Affinity between a user's interests and an event's tags, in `0..=100`.
///
/// Returns 0 when either side is empty. An event tag matches when any
/// interest equals it ignoring case; the score is the rounded percentage of
/// event tags that match.
///
/// ```
/// use locali_events::match_score;
///
/// assert_eq!(match_score(&["AI"], &["ai", "ML"]), 50);
/// assert_eq!(match_score(&["ai", "ml"], &["AI"]), 100);
/// assert_eq!(match_score::<&str, &str>(&[], &["AI"]), 0);
/// ```
#[must_use]
pub fn match_score<I, T>(interests: &[I], tags: &[T]) -> u8
where
    I: AsRef<str>,
    T: AsRef<str>,
{
    if interests.is_empty() || tags.is_empty() {
        return 0;
    }

    let interests: Vec<String> = interests.iter().map(|i| i.as_ref().to_lowercase()).collect();
    let matching = tags
        .iter()
        .filter(|tag| {
            let tag = tag.as_ref().to_lowercase();
            interests.iter().any(|interest| *interest == tag)
        })
        .count();

    // round(100 * m / n) in integers; m <= n so the result fits in 0..=100
    let total = tags.len();
    let percent = (200 * matching + total) / (2 * total);
    u8::try_from(percent).unwrap_or(100)
}

/// An event together with its match score for some user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredEvent {
    /// The event
    pub event: Event,
    /// Match score in `0..=100`
    pub score: u8,
}

/// Attach a match score to every event, keeping the given order.
#[must_use]
pub fn score_events<I: AsRef<str>>(events: Vec<Event>, interests: &[I]) -> Vec<ScoredEvent> {
    events
        .into_iter()
        .map(|event| {
            let score = match_score(interests, event.tags());
            ScoredEvent { event, score }
        })
        .collect()
}

/// Sort by descending score; equal scores are ordered by event id.
pub fn rank(scored: &mut [ScoredEvent]) {
    scored.sort_by(|a, b| {
        Reverse(a.score)
            .cmp(&Reverse(b.score))
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
}

/// The best `limit` events with a score above zero.
///
/// Returns nothing when the user has no interests.
#[must_use]
pub fn recommend<I: AsRef<str>>(events: Vec<Event>, interests: &[I], limit: usize) -> Vec<ScoredEvent> {
    if interests.is_empty() {
        return Vec::new();
    }

    let mut scored = score_events(events, interests);
    rank(&mut scored);
    scored.retain(|s| s.score > 0);
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventRecord;
    use proptest::prelude::*;

    fn event(id: &str, tags: &[&str]) -> Event {
        Event {
            id: id.into(),
            record: EventRecord {
                tags: tags.iter().map(|t| (*t).to_string()).collect(),
                ..EventRecord::default()
            },
        }
    }

    #[test]
    fn empty_sides_score_zero() {
        assert_eq!(match_score::<&str, &str>(&[], &["AI"]), 0);
        assert_eq!(match_score::<&str, &str>(&["AI"], &[]), 0);
    }

    #[test]
    fn denominator_is_event_tag_count() {
        assert_eq!(match_score(&["AI"], &["ai", "ML"]), 50);
        assert_eq!(match_score(&["ai", "ml"], &["AI"]), 100);
        assert_eq!(match_score(&["Data"], &["data"]), 100);
        assert_eq!(match_score(&["AI"], &["AI", "ML", "Robotics"]), 33);
        assert_eq!(match_score(&["AI", "ML"], &["AI", "ML", "Robotics"]), 67);
    }

    #[test]
    fn duplicate_event_tags_each_count() {
        assert_eq!(match_score(&["AI"], &["AI", "ai", "Music"]), 67);
    }

    #[test]
    fn recommend_ranks_filters_and_limits() {
        let events = vec![
            event("c", &["AI"]),
            event("a", &["AI", "Music"]),
            event("z", &["Cooking"]),
            event("b", &["AI"]),
            event("d", &["Music", "Art", "AI", "Film"]),
        ];

        let picks = recommend(events, &["ai"], 3);
        let ids: Vec<_> = picks.iter().map(|s| s.event.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(picks[2].score, 50);
    }

    #[test]
    fn recommend_without_interests_is_empty() {
        assert!(recommend::<&str>(vec![event("a", &["AI"])], &[], 3).is_empty());
    }

    proptest! {
        #[test]
        fn score_is_a_percentage(
            interests in prop::collection::vec("[a-cA-C]{1,2}", 0..5),
            tags in prop::collection::vec("[a-cA-C]{1,2}", 0..8),
        ) {
            let score = match_score(&interests, &tags);
            prop_assert!(score <= 100);
            if interests.is_empty() || tags.is_empty() {
                prop_assert_eq!(score, 0);
            }
        }

        #[test]
        fn score_ignores_case(
            interests in prop::collection::vec("[a-z]{1,4}", 1..4),
            tags in prop::collection::vec("[a-z]{1,4}", 1..6),
        ) {
            let upper: Vec<String> = tags.iter().map(|t| t.to_uppercase()).collect();
            prop_assert_eq!(match_score(&interests, &tags), match_score(&interests, &upper));
        }

        #[test]
        fn tags_drawn_from_interests_score_full(
            interests in prop::collection::vec("[a-z]{1,4}", 1..4),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6),
        ) {
            let tags: Vec<String> = picks.iter().map(|i| i.get(&interests).to_uppercase()).collect();
            prop_assert_eq!(match_score(&interests, &tags), 100);
        }
    }
}
