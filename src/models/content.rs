//! Content pool seam: where candidate items for "new" study come from.
//! The engine never interprets item ids; difficulty is only used to filter.
use super::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: ItemId,
    pub difficulty: u8,
}

/// Supplies candidate items, already filtered by difficulty.
pub trait ContentPool {
    fn list(&self, predicate: &dyn Fn(u8) -> bool) -> Vec<ItemRef>;
}

/// Fixed list of items, e.g. a word book loaded from JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StaticPool {
    pub name: String,
    pub items: Vec<ItemRef>,
}

impl StaticPool {
    pub fn new(name: impl Into<String>, items: Vec<ItemRef>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

impl ContentPool for StaticPool {
    fn list(&self, predicate: &dyn Fn(u8) -> bool) -> Vec<ItemRef> {
        self.items
            .iter()
            .copied()
            .filter(|item| predicate(item.difficulty))
            .collect()
    }
}

/// Named difficulty bands. Bands overlap at their edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

impl DifficultyFilter {
    pub fn matches(self, difficulty: u8) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Easy => difficulty <= 2,
            DifficultyFilter::Medium => (2..=4).contains(&difficulty),
            DifficultyFilter::Hard => difficulty >= 4,
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(DifficultyFilter::All),
            "easy" => Ok(DifficultyFilter::Easy),
            "medium" => Ok(DifficultyFilter::Medium),
            "hard" => Ok(DifficultyFilter::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyFilter::All => "all",
            DifficultyFilter::Easy => "easy",
            DifficultyFilter::Medium => "medium",
            DifficultyFilter::Hard => "hard",
        };
        f.write_str(name)
    }
}
