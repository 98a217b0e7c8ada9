pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod persistence;
pub mod progress;
pub mod queue;
pub mod store;

pub use config::EngineConfig;
pub use error::{Error, PersistenceError, Result};
pub use export::Document;
pub use models::{
    ContentPool, DifficultyFilter, GlobalStats, ItemId, ItemRef, LearningSession, Quality,
    ReviewRecord, SessionState, StaticPool,
};
pub use persistence::{FileAdapter, MemoryAdapter, PersistenceAdapter};
pub use progress::{DailyProgress, LevelInfo, calculate_level};
pub use store::{ReviewStore, ReviewSummary, StatsSnapshot};
