pub mod content;
pub mod global_stats;
pub mod learning_session;
pub mod quality;
pub mod review_record;
pub mod sm2;

pub use content::{ContentPool, DifficultyFilter, ItemRef, StaticPool};
pub use global_stats::GlobalStats;
pub use learning_session::{LearningSession, SessionState};
pub use quality::Quality;
pub use review_record::{
    DEFAULT_EASE_FACTOR, ItemId, MASTERED_REPETITIONS, MIN_EASE_FACTOR, ReviewRecord,
};
