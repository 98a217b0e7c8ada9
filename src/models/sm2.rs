//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Quality grades 0-2: streak resets and the item comes back the next day
//! - Quality grades 3-5: interval grows 1 day → 6 days → interval × EF
//! - The interval is computed with the EF as it stood before the review,
//!   then EF is adjusted from the same grade and floored at 1.3

use super::{MIN_EASE_FACTOR, Quality, ReviewRecord};
use chrono::{DateTime, Duration, Utc};

/// Upper bound on any interval (100 years) so due dates stay representable.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = 5.0 - f64::from(quality.value());
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

/// Calculates the record that results from grading `record` at `now`.
/// Pure: the clock is whatever the caller passes in.
pub fn review(record: &ReviewRecord, quality: Quality, now: DateTime<Utc>) -> ReviewRecord {
    let mut next = record.clone();

    if quality.is_passing() {
        next.repetitions = next.repetitions.saturating_add(1);
        next.correct_count = next.correct_count.saturating_add(1);
        next.interval = match next.repetitions {
            1 => 1,
            2 => 6,
            // Old EF on purpose; it is updated below.
            _ => ((f64::from(record.interval) * record.ease_factor).round() as u32)
                .clamp(1, MAX_INTERVAL_DAYS),
        };
    } else {
        next.repetitions = 0;
        next.interval = 1;
        next.incorrect_count = next.incorrect_count.saturating_add(1);
    }

    next.ease_factor = next_ease_factor(record.ease_factor, quality);

    next.next_review_at = Some(now + Duration::days(i64::from(next.interval)));
    next.last_review_at = Some(now);
    next.total_reviews = next.total_reviews.saturating_add(1);

    next
}
