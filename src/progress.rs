//! Level, experience, achievements and daily progress.
//!
//! Everything here is derived from the store's statistics on demand.
//! Only `DailyProgress` is state, and it lives outside the review document.

use crate::models::Quality;
use crate::store::StatsSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const EXP_PER_LEVEL: u64 = 1000;
const EXP_PER_REVIEW: u64 = 10;
const ACCURACY_BONUS: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: u64,
    pub current_exp: u64,
    pub next_exp: u64,
    pub total_exp: u64,
}

/// Every 1000 experience points is a level; levels start at 1.
pub fn calculate_level(stats: &StatsSnapshot) -> LevelInfo {
    let base_exp = stats.total_reviews.saturating_mul(EXP_PER_REVIEW);
    let bonus_exp = (stats.total_reviews as f64 * f64::from(stats.accuracy) / 100.0
        * ACCURACY_BONUS)
        .floor() as u64;
    // The float cast saturates too, so huge imported totals cap at u64::MAX.
    let total_exp = base_exp.saturating_add(bonus_exp);
    let current_exp = total_exp % EXP_PER_LEVEL;

    LevelInfo {
        level: total_exp / EXP_PER_LEVEL + 1,
        current_exp,
        next_exp: EXP_PER_LEVEL - current_exp,
        total_exp,
    }
}

/// Experience awarded for a single answer of the given grade
pub fn experience_gain(quality: Quality) -> u32 {
    u32::from(quality.value()) * 5
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Achievement {
    FirstItem,
    WeekStreak,
    Diligent,
    HundredItems,
    Perfectionist,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::FirstItem,
        Achievement::WeekStreak,
        Achievement::Diligent,
        Achievement::HundredItems,
        Achievement::Perfectionist,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstItem => "First steps",
            Achievement::WeekStreak => "Seven day streak",
            Achievement::Diligent => "Diligent learner",
            Achievement::HundredItems => "Hundred items",
            Achievement::Perfectionist => "Perfectionist",
        }
    }

    pub fn is_unlocked(self, stats: &StatsSnapshot) -> bool {
        match self {
            Achievement::FirstItem => stats.total_words >= 1,
            Achievement::WeekStreak => stats.streak_days >= 7,
            Achievement::Diligent => stats.total_words >= 50,
            Achievement::HundredItems => stats.total_words >= 100,
            Achievement::Perfectionist => stats.accuracy >= 95 && stats.total_words >= 50,
        }
    }
}

pub fn unlocked_achievements(stats: &StatsSnapshot) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| a.is_unlocked(stats))
        .collect()
}

/// Items completed on the current calendar day.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: Option<NaiveDate>,
    pub completed: u32,
}

impl DailyProgress {
    /// Adds `count`, starting over when `today` is a new day.
    pub fn record(&mut self, count: u32, today: NaiveDate) {
        if self.date != Some(today) {
            self.date = Some(today);
            self.completed = 0;
        }
        self.completed = self.completed.saturating_add(count);
    }

    pub fn completed_on(&self, today: NaiveDate) -> u32 {
        if self.date == Some(today) {
            self.completed
        } else {
            0
        }
    }

    pub fn remaining(&self, target: u32, today: NaiveDate) -> u32 {
        target.saturating_sub(self.completed_on(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_reviews: u64, accuracy: u32) -> StatsSnapshot {
        StatsSnapshot {
            total_reviews,
            accuracy,
            ..StatsSnapshot::default()
        }
    }

    #[test]
    fn test_level_starts_at_one() {
        let info = calculate_level(&StatsSnapshot::default());
        assert_eq!(
            info,
            LevelInfo {
                level: 1,
                current_exp: 0,
                next_exp: 1000,
                total_exp: 0
            }
        );
    }

    #[test]
    fn test_level_with_bonus() {
        // base 1000 + floor(100 * 0.7 * 5) = 1350
        let info = calculate_level(&stats(100, 70));
        assert_eq!(info.total_exp, 1350);
        assert_eq!(info.level, 2);
        assert_eq!(info.current_exp, 350);
        assert_eq!(info.next_exp, 650);
    }

    #[test]
    fn test_bonus_is_floored() {
        // 3 * 0.67 * 5 = 10.05
        assert_eq!(calculate_level(&stats(3, 67)).total_exp, 40);
    }

    #[test]
    fn test_level_saturates_on_huge_totals() {
        let info = calculate_level(&stats(u64::MAX, 100));
        assert_eq!(info.total_exp, u64::MAX);
        assert_eq!(info.level, u64::MAX / EXP_PER_LEVEL + 1);
        assert_eq!(info.current_exp + info.next_exp, EXP_PER_LEVEL);
    }

    #[test]
    fn test_experience_gain() {
        assert_eq!(experience_gain(Quality::new(0).unwrap()), 0);
        assert_eq!(experience_gain(Quality::new(5).unwrap()), 25);
    }

    #[test]
    fn test_achievements() {
        let mut s = StatsSnapshot::default();
        assert!(unlocked_achievements(&s).is_empty());

        s.total_words = 60;
        s.accuracy = 96;
        s.streak_days = 7;
        assert_eq!(
            unlocked_achievements(&s),
            vec![
                Achievement::FirstItem,
                Achievement::WeekStreak,
                Achievement::Diligent,
                Achievement::Perfectionist
            ]
        );
    }

    #[test]
    fn test_daily_progress_rolls_over() {
        let monday = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let tuesday = monday.succ_opt().unwrap();
        let mut progress = DailyProgress::default();

        progress.record(4, monday);
        progress.record(1, monday);
        assert_eq!(progress.completed_on(monday), 5);
        assert_eq!(progress.remaining(20, monday), 15);
        assert_eq!(progress.remaining(20, tuesday), 20);

        progress.record(2, tuesday);
        assert_eq!(progress.completed_on(tuesday), 2);
        assert_eq!(progress.remaining(1, tuesday), 0);
    }
}
