use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier owned by the content pool.
pub type ItemId = i64;

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Streak length at which an item counts as mastered.
pub const MASTERED_REPETITIONS: u32 = 5;

/// Per-item scheduling state. Built by the store, mutated only by the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewRecord {
    pub item_id: ItemId,
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    /// `None` means due immediately
    pub next_review_at: Option<DateTime<Utc>>,
    pub last_review_at: Option<DateTime<Utc>>,
    pub correct_count: u64,
    pub incorrect_count: u64,
    pub total_reviews: u64,
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub(crate) fn new(item_id: ItemId, created_at: DateTime<Utc>) -> Self {
        Self {
            item_id,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            next_review_at: None,
            last_review_at: None,
            correct_count: 0,
            incorrect_count: 0,
            total_reviews: 0,
            created_at,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.is_none_or(|at| at <= now)
    }

    pub fn is_mastered(&self) -> bool {
        self.repetitions >= MASTERED_REPETITIONS
    }

    pub fn is_learning(&self) -> bool {
        self.repetitions > 0 && self.repetitions < MASTERED_REPETITIONS
    }

    pub fn is_new(&self) -> bool {
        self.repetitions == 0
    }

    /// Checks the invariants the scheduler maintains. Used on import.
    pub fn check_invariants(&self) -> Result<(), String> {
        let id = self.item_id;
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            return Err(format!(
                "item {id}: ease factor {} below {MIN_EASE_FACTOR}",
                self.ease_factor
            ));
        }
        if self.repetitions >= 1 && self.interval < 1 {
            return Err(format!("item {id}: interval must be >= 1 once repeated"));
        }
        match self.correct_count.checked_add(self.incorrect_count) {
            None => return Err(format!("item {id}: counters overflow")),
            Some(sum) if sum != self.total_reviews => {
                return Err(format!(
                    "item {id}: correct + incorrect does not equal total reviews"
                ));
            }
            Some(_) => {}
        }
        if u64::from(self.repetitions) > self.correct_count {
            return Err(format!("item {id}: repetitions exceed correct answers"));
        }
        if self.total_reviews > 0 && (self.last_review_at.is_none() || self.next_review_at.is_none())
        {
            return Err(format!("item {id}: reviewed item is missing review timestamps"));
        }
        Ok(())
    }
}
