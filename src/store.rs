//! Review state store: owns every item's record and the learner's stats.
//!
//! Writes stage the record and stats update together, commit both in memory,
//! then persist one document. If the save fails the committed state stays
//! in memory, marked dirty, and `flush` can retry it.

use crate::error::{Error, Result};
use crate::export::Document;
use crate::models::{
    ContentPool, GlobalStats, ItemId, ItemRef, Quality, ReviewRecord, sm2,
};
use crate::persistence::PersistenceAdapter;
use crate::queue;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Outcome of a single graded review
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub interval: u32,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
    pub quality: Quality,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_reviews: u64,
    pub correct_answers: u64,
    pub accuracy: u32,
    pub total_words: usize,
    pub mastered_words: usize,
    pub learning_words: usize,
    pub new_words: usize,
    pub streak_days: u32,
    pub last_study_date: Option<NaiveDate>,
    pub last_review_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct ReviewStore<A: PersistenceAdapter> {
    records: BTreeMap<ItemId, ReviewRecord>,
    stats: GlobalStats,
    adapter: A,
    dirty: bool,
}

impl<A: PersistenceAdapter> ReviewStore<A> {
    /// Loads whatever the adapter holds; an empty adapter gives an empty store.
    /// A stored document that fails validation is rejected, not partially loaded.
    pub fn open(adapter: A) -> Result<Self> {
        let mut store = Self {
            records: BTreeMap::new(),
            stats: GlobalStats::default(),
            adapter,
            dirty: false,
        };

        if let Some(bytes) = store.adapter.load()? {
            let doc = Document::from_bytes(&bytes)?;
            info!("loaded review state with {} records", doc.records.len());
            store.records = doc.records;
            store.stats = doc.stats;
        }

        Ok(store)
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// True when the in-memory state has not been persisted yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, item_id: ItemId) -> Option<&ReviewRecord> {
        self.records.get(&item_id)
    }

    /// Returns the item's record, creating the default one on first access.
    pub fn get_or_create(&mut self, item_id: ItemId, now: DateTime<Utc>) -> &ReviewRecord {
        if !self.records.contains_key(&item_id) {
            debug!("creating review record for item {item_id}");
            self.dirty = true;
        }
        self.records
            .entry(item_id)
            .or_insert_with(|| ReviewRecord::new(item_id, now))
    }

    pub fn records(&self) -> impl Iterator<Item = &ReviewRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Grades an item at `now`, updates stats, and persists both together.
    pub fn apply_review(
        &mut self,
        item_id: ItemId,
        quality: i64,
        now: DateTime<Utc>,
    ) -> Result<ReviewSummary> {
        let quality = Quality::new(quality)?;

        let current = self
            .records
            .get(&item_id)
            .cloned()
            .unwrap_or_else(|| ReviewRecord::new(item_id, now));
        let updated = sm2::review(&current, quality, now);
        let mut stats = self.stats.clone();
        stats.record_review(quality.is_passing(), now);

        let summary = ReviewSummary {
            interval: updated.interval,
            ease_factor: updated.ease_factor,
            repetitions: updated.repetitions,
            next_review_at: updated.next_review_at.unwrap_or(now),
            quality,
        };

        debug!(
            "item {item_id} graded {}: interval {}d, ease {:.2}, streak {}",
            quality.value(),
            summary.interval,
            summary.ease_factor,
            summary.repetitions
        );

        self.records.insert(item_id, updated);
        self.stats = stats;
        self.dirty = true;

        self.flush(now)?;
        Ok(summary)
    }

    pub fn stats(&self) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot {
            total_reviews: self.stats.total_reviews,
            correct_answers: self.stats.correct_answers,
            accuracy: self.stats.accuracy(),
            total_words: self.records.len(),
            streak_days: self.stats.streak_days,
            last_study_date: self.stats.last_study_date,
            last_review_at: self.stats.last_review_at,
            ..StatsSnapshot::default()
        };
        for record in self.records.values() {
            if record.is_mastered() {
                snapshot.mastered_words += 1;
            } else if record.is_learning() {
                snapshot.learning_words += 1;
            } else {
                snapshot.new_words += 1;
            }
        }
        snapshot
    }

    /// Clears every record and the stats, then persists the empty state.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<()> {
        info!("resetting review state ({} records)", self.records.len());
        self.records.clear();
        self.stats = GlobalStats::default();
        self.dirty = true;
        self.flush(now)
    }

    pub fn export_snapshot(&self, now: DateTime<Utc>) -> Document {
        Document::new(self.records.clone(), self.stats.clone(), now)
    }

    /// All-or-nothing: the document is fully validated before anything is replaced.
    pub fn import_snapshot(&mut self, doc: Document, now: DateTime<Utc>) -> Result<()> {
        if let Err(e) = doc.validate() {
            warn!("rejected snapshot import: {e}");
            return Err(e);
        }

        info!("importing snapshot with {} records", doc.records.len());
        self.records = doc.records;
        self.stats = doc.stats;
        self.dirty = true;
        self.flush(now)
    }

    /// Writes the current state through the adapter.
    pub fn flush(&mut self, now: DateTime<Utc>) -> Result<()> {
        let bytes = self.export_snapshot(now).to_bytes()?;
        match self.adapter.save(&bytes) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                warn!("failed to persist review state: {e}");
                Err(Error::Persistence(e))
            }
        }
    }

    pub fn due_items(&self, now: DateTime<Utc>) -> Vec<ReviewRecord> {
        queue::due_items(self.records.values(), now)
    }

    /// Picks up to `count` pool items the store has never seen.
    pub fn new_items<R: Rng + ?Sized>(
        &self,
        pool: &dyn ContentPool,
        exclude: &HashSet<ItemId>,
        count: usize,
        predicate: &dyn Fn(u8) -> bool,
        rng: &mut R,
    ) -> Vec<ItemRef> {
        let known: HashSet<ItemId> = self.records.keys().copied().collect();
        queue::new_items(pool, &known, exclude, count, predicate, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryAdapter;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap()
    }

    fn store() -> ReviewStore<MemoryAdapter> {
        ReviewStore::open(MemoryAdapter::new()).unwrap()
    }

    #[test]
    fn test_get_or_create_defaults() {
        let mut store = store();
        let record = store.get_or_create(42, t0());
        assert_eq!(record.ease_factor, 2.5);
        assert_eq!(record.interval, 0);
        assert_eq!(record.created_at, t0());
        assert!(store.is_dirty());

        // second access keeps the original creation time
        let again = store.get_or_create(42, t0() + Duration::days(2));
        assert_eq!(again.created_at, t0());
    }

    #[test]
    fn test_apply_review_persists() {
        let mut store = store();
        let summary = store.apply_review(42, 5, t0()).unwrap();

        assert_eq!(summary.repetitions, 1);
        assert_eq!(summary.interval, 1);
        assert_eq!(summary.next_review_at, t0() + Duration::days(1));
        assert!(!store.is_dirty());
        assert_eq!(store.adapter().save_count(), 1);

        let reopened = ReviewStore::open(store.adapter().clone()).unwrap();
        assert_eq!(reopened.get(42), store.get(42));
        assert_eq!(reopened.stats(), store.stats());
    }

    #[test]
    fn test_invalid_quality_leaves_state() {
        let mut store = store();
        store.apply_review(1, 4, t0()).unwrap();
        let before = store.export_snapshot(t0());

        assert!(store.apply_review(1, 6, t0()).unwrap_err().is_validation());
        assert!(store.apply_review(2, -1, t0()).unwrap_err().is_validation());

        assert_eq!(store.export_snapshot(t0()), before);
        assert!(store.get(2).is_none());
        assert_eq!(store.adapter().save_count(), 1);
    }

    #[test]
    fn test_failed_save_keeps_state_for_retry() {
        let mut store = store();
        store.adapter_mut().fail_next_saves(1);

        let err = store.apply_review(7, 5, t0()).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(store.is_dirty());
        assert_eq!(store.get(7).unwrap().repetitions, 1);
        assert_eq!(store.stats().total_reviews, 1);

        store.flush(t0()).unwrap();
        assert!(!store.is_dirty());
        let reopened = ReviewStore::open(store.adapter().clone()).unwrap();
        assert_eq!(reopened.stats().total_reviews, 1);
    }

    #[test]
    fn test_stats_buckets() {
        let mut store = store();
        store.get_or_create(1, t0());
        store.apply_review(2, 4, t0()).unwrap();
        for day in 0..5 {
            store
                .apply_review(3, 5, t0() + Duration::days(day * 30))
                .unwrap();
        }

        let stats = store.stats();
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.new_words, 1);
        assert_eq!(stats.learning_words, 1);
        assert_eq!(stats.mastered_words, 1);
        assert_eq!(stats.total_reviews, 6);
        assert_eq!(stats.accuracy, 100);
    }

    #[test]
    fn test_reset() {
        let mut store = store();
        store.apply_review(1, 5, t0()).unwrap();
        store.reset(t0()).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.stats(), StatsSnapshot::default());
        let reopened = ReviewStore::open(store.adapter().clone()).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_import_rejects_bad_version() {
        let mut store = store();
        store.apply_review(1, 5, t0()).unwrap();
        let before = store.export_snapshot(t0());

        let mut other = ReviewStore::open(MemoryAdapter::new()).unwrap();
        other.apply_review(99, 1, t0()).unwrap();
        let mut doc = other.export_snapshot(t0());
        doc.version = "2.0".to_string();

        assert!(store.import_snapshot(doc, t0()).unwrap_err().is_validation());
        assert_eq!(store.export_snapshot(t0()), before);
        assert_eq!(store.adapter().save_count(), 1);
    }

    #[test]
    fn test_import_rejects_invalid_record() {
        let mut store = store();
        let mut doc = store.export_snapshot(t0());
        let mut record = ReviewRecord::new(5, t0());
        record.ease_factor = 0.9;
        doc.records.insert(5, record);

        assert!(store.import_snapshot(doc, t0()).is_err());
        assert!(store.get(5).is_none());
    }

    #[test]
    fn test_imported_maximum_counters_keep_working() {
        use crate::progress::calculate_level;

        let mut store = store();
        let mut doc = store.export_snapshot(t0());
        doc.stats = GlobalStats {
            total_reviews: u64::MAX,
            correct_answers: 0,
            last_study_date: Some((t0() - Duration::days(1)).date_naive()),
            streak_days: u32::MAX,
            last_review_at: Some(t0() - Duration::days(1)),
        };
        store.import_snapshot(doc, t0()).unwrap();

        let level = calculate_level(&store.stats());
        assert_eq!(level.total_exp, u64::MAX);

        store.apply_review(1, 5, t0()).unwrap();
        let stats = store.stats();
        assert_eq!(stats.total_reviews, u64::MAX);
        assert_eq!(stats.streak_days, u32::MAX);
        assert_eq!(stats.correct_answers, 1);
    }

    #[test]
    fn test_open_rejects_corrupt_document() {
        let adapter = MemoryAdapter::with_bytes(b"not json".to_vec());
        assert!(ReviewStore::open(adapter).unwrap_err().is_validation());
    }

    #[test]
    fn test_new_items_skip_known() {
        use crate::models::StaticPool;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let mut store = store();
        store.apply_review(1, 5, t0()).unwrap();
        let pool = StaticPool::new(
            "p",
            vec![
                ItemRef { id: 1, difficulty: 1 },
                ItemRef { id: 2, difficulty: 1 },
            ],
        );
        let mut rng = StdRng::seed_from_u64(3);

        let picked = store.new_items(&pool, &HashSet::new(), 10, &|_| true, &mut rng);
        assert_eq!(picked, vec![ItemRef { id: 2, difficulty: 1 }]);
    }
}
