//! User Name Value Object
//!
//! 表示名。前後の空白は除去され、長さは 2〜100 文字（Unicode コードポイント単位）。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LmsError, LmsResult};

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 2;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(raw: &str) -> LmsResult<Self> {
        let name = raw.trim();
        let len = name.chars().count();

        if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&len) {
            return Err(LmsError::validation(
                "name",
                format!(
                    "Name must be between {} and {} characters",
                    USER_NAME_MIN_LENGTH, USER_NAME_MAX_LENGTH
                ),
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed() {
        assert_eq!(UserName::new("  Ann  ").unwrap().as_str(), "Ann");
    }

    #[test]
    fn test_length_bounds() {
        assert!(UserName::new("A").is_err());
        assert!(UserName::new("  A  ").is_err());
        assert!(UserName::new("Al").is_ok());
        assert!(UserName::new(&"x".repeat(100)).is_ok());
        assert!(UserName::new(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert!(UserName::new("李明").is_ok());
    }
}
