//! Self-assessed recall grade, 0 (blackout) to 5 (perfect).
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const MAX_QUALITY: u8 = 5;
pub const PASSING_QUALITY: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Rejects anything outside 0..=5. No clamping.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=MAX_QUALITY as i64).contains(&value) {
            Ok(Quality(value as u8))
        } else {
            Err(Error::validation(format!(
                "quality {value} is outside 0..={MAX_QUALITY}"
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_passing(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<i64> for Quality {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_range() {
        for v in 0..=5 {
            assert_eq!(Quality::new(v).unwrap().value(), v as u8);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Quality::new(-1).unwrap_err().is_validation());
        assert!(Quality::new(6).unwrap_err().is_validation());
    }

    #[test]
    fn test_passing_threshold() {
        assert!(!Quality::new(2).unwrap().is_passing());
        assert!(Quality::new(3).unwrap().is_passing());
    }
}
