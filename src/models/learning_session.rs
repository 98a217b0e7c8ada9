//! Practice session bookkeeping.
//! Counts answers, times the session, and requeues missed items in memory.

use super::{ItemId, Quality};
use crate::error::Result;
use crate::persistence::PersistenceAdapter;
use crate::store::{ReviewStore, ReviewSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::global_stats::percentage;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub words_studied: u64,
    pub correct_answers: u64,
    pub start_time: Option<DateTime<Utc>>,
    /// `None` while the session is still open
    pub end_time: Option<DateTime<Utc>>,
}

/// Transient practice session. Nothing here reaches the store's schedule
/// except through `grade`, which goes via `ReviewStore::apply_review`.
#[derive(Clone, Debug, Default)]
pub struct LearningSession {
    pub state: SessionState,
    queue: VecDeque<ItemId>,
    completed: Vec<ItemId>,
}

impl LearningSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes the counters and stamps the start time.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.state = SessionState {
            start_time: Some(now),
            ..SessionState::default()
        };
        self.completed.clear();
    }

    /// Stamps the end time; counters stay readable.
    pub fn end(&mut self, now: DateTime<Utc>) {
        self.state.end_time = Some(now);
    }

    pub fn load_queue(&mut self, items: impl IntoIterator<Item = ItemId>) {
        self.queue = items.into_iter().collect();
    }

    pub fn next_item(&mut self) -> Option<ItemId> {
        self.queue.pop_front()
    }

    pub fn peek_item(&self) -> Option<ItemId> {
        self.queue.front().copied()
    }

    pub fn queue(&self) -> impl Iterator<Item = &ItemId> {
        self.queue.iter()
    }

    pub fn completed(&self) -> &[ItemId] {
        &self.completed
    }

    pub fn mark_correct(&mut self, item_id: ItemId) {
        self.state.correct_answers += 1;
        self.state.words_studied += 1;
        self.completed.push(item_id);
    }

    /// Counts the miss and sends the item to the back of this session's queue.
    pub fn mark_incorrect(&mut self, item_id: ItemId) {
        self.state.words_studied += 1;
        self.queue.retain(|&id| id != item_id);
        self.queue.push_back(item_id);
    }

    /// Applies the grade to the store, then updates the session counters.
    /// A rejected grade leaves the session untouched.
    pub fn grade<A: PersistenceAdapter>(
        &mut self,
        store: &mut ReviewStore<A>,
        item_id: ItemId,
        quality: i64,
        now: DateTime<Utc>,
    ) -> Result<ReviewSummary> {
        let quality = Quality::new(quality)?;
        let summary = store.apply_review(item_id, i64::from(quality.value()), now)?;
        if quality.is_passing() {
            self.mark_correct(item_id);
        } else {
            self.mark_incorrect(item_id);
        }
        Ok(summary)
    }

    pub fn accuracy(&self) -> u32 {
        percentage(self.state.correct_answers, self.state.words_studied)
    }

    /// Seconds since start, up to the end time or `now` if still open.
    pub fn duration(&self, now: DateTime<Utc>) -> i64 {
        match self.state.start_time {
            Some(start) => (self.state.end_time.unwrap_or(now) - start).num_seconds(),
            None => 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.start_time.is_some() && self.state.end_time.is_none()
    }

    pub fn remaining_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_completed(&self) -> bool {
        self.queue.is_empty()
    }
}
