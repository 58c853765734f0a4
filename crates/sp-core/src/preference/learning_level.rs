use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_LEARNING_LEVEL: u8 = 1;
pub const MAX_LEARNING_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearningLevelError {
    #[error("learning level must be between {MIN_LEARNING_LEVEL} and {MAX_LEARNING_LEVEL}, got {0}")]
    OutOfRange(i64),
}

/// Self-reported learning level, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LearningLevel(u8);

impl LearningLevel {
    pub fn new(level: i64) -> Result<Self, LearningLevelError> {
        if (i64::from(MIN_LEARNING_LEVEL)..=i64::from(MAX_LEARNING_LEVEL)).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(LearningLevelError::OutOfRange(level))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for LearningLevel {
    type Error = LearningLevelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LearningLevel> for i64 {
    fn from(level: LearningLevel) -> Self {
        i64::from(level.0)
    }
}

impl std::fmt::Display for LearningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
