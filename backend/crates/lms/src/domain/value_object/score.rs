//! Bounded integers: grade score and course duration

use serde::{Deserialize, Serialize};

use crate::error::{LmsError, LmsResult};

/// Grade between 0 and 100 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MAX: i64 = 100;

    pub fn new(raw: i64) -> LmsResult<Self> {
        if !(0..=Self::MAX).contains(&raw) {
            return Err(LmsError::validation(
                "score",
                "Score must be between 0 and 100",
            ));
        }
        Ok(Self(raw as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Course length in hours, 1 to 1000
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseDuration(u32);

impl CourseDuration {
    pub const MAX: i64 = 1000;

    pub fn new(raw: i64) -> LmsResult<Self> {
        if !(1..=Self::MAX).contains(&raw) {
            return Err(LmsError::validation(
                "duration",
                "Duration must be a number between 1 and 1000",
            ));
        }
        Ok(Self(raw as u32))
    }

    pub fn hours(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert_eq!(Score::new(0).unwrap().value(), 0);
        assert_eq!(Score::new(100).unwrap().value(), 100);
        assert!(Score::new(-1).is_err());
        assert!(Score::new(101).is_err());
    }

    #[test]
    fn test_duration_bounds() {
        assert!(CourseDuration::new(0).is_err());
        assert_eq!(CourseDuration::new(40).unwrap().hours(), 40);
        assert!(CourseDuration::new(1001).is_err());
    }
}
