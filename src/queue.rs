//! Due queue and new-item selection.
//!
//! Due items are ordered: never-scheduled first, then oldest `next_review_at`,
//! ties by ascending item id. New items are shuffled with a caller-supplied RNG.

use crate::models::{ContentPool, ItemId, ItemRef, ReviewRecord};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Records with `next_review_at` unset or at/before `now`, in review order.
pub fn due_items<'a>(
    records: impl IntoIterator<Item = &'a ReviewRecord>,
    now: DateTime<Utc>,
) -> Vec<ReviewRecord> {
    let mut due: Vec<ReviewRecord> = records
        .into_iter()
        .filter(|r| r.is_due(now))
        .cloned()
        .collect();
    // `None` orders before any `Some`.
    due.sort_by_key(|r| (r.next_review_at, r.item_id));
    due
}

/// Draws up to `count` pool items that are neither known nor excluded.
pub fn new_items<R: Rng + ?Sized>(
    pool: &dyn ContentPool,
    known: &HashSet<ItemId>,
    exclude: &HashSet<ItemId>,
    count: usize,
    predicate: &dyn Fn(u8) -> bool,
    rng: &mut R,
) -> Vec<ItemRef> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<ItemRef> = pool
        .list(predicate)
        .into_iter()
        .filter(|item| predicate(item.difficulty))
        .filter(|item| !known.contains(&item.id) && !exclude.contains(&item.id))
        .filter(|item| seen.insert(item.id))
        .collect();

    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}

/// Session queue: due items first, then new ones, each capped.
pub fn plan_practice(
    due: &[ReviewRecord],
    fresh: &[ItemRef],
    max_due: usize,
    max_new: usize,
) -> Vec<ItemId> {
    due.iter()
        .take(max_due)
        .map(|r| r.item_id)
        .chain(fresh.iter().take(max_new).map(|i| i.id))
        .collect()
}
