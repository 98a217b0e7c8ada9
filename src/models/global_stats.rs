//! Learner-wide counters and the daily study streak.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GlobalStats {
    pub total_reviews: u64,
    pub correct_answers: u64,
    /// Calendar day (UTC) of the latest study activity
    pub last_study_date: Option<NaiveDate>,
    pub streak_days: u32,
    pub last_review_at: Option<DateTime<Utc>>,
}

impl GlobalStats {
    /// Counts one review at `now` and advances the streak by calendar day.
    pub fn record_review(&mut self, passed: bool, now: DateTime<Utc>) {
        let today = now.date_naive();
        match self.last_study_date {
            None => {
                self.streak_days = 1;
                self.last_study_date = Some(today);
            }
            Some(last) if today == last => {}
            Some(last) if last.succ_opt() == Some(today) => {
                self.streak_days = self.streak_days.saturating_add(1);
                self.last_study_date = Some(today);
            }
            Some(last) if today > last => {
                self.streak_days = 1;
                self.last_study_date = Some(today);
            }
            // A review stamped before the last study day does not move the streak.
            Some(_) => {}
        }

        self.total_reviews = self.total_reviews.saturating_add(1);
        if passed {
            self.correct_answers = self.correct_answers.saturating_add(1);
        }
        // Never moves backwards.
        self.last_review_at = Some(self.last_review_at.map_or(now, |at| at.max(now)));
    }

    /// Rounded percentage of passing reviews, 0 when nothing was reviewed.
    pub fn accuracy(&self) -> u32 {
        percentage(self.correct_answers, self.total_reviews)
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        if self.correct_answers > self.total_reviews {
            return Err("stats: correct answers exceed total reviews".to_string());
        }
        if self.streak_days > 0 && self.last_study_date.is_none() {
            return Err("stats: streak without a last study date".to_string());
        }
        Ok(())
    }
}

pub(crate) fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}
