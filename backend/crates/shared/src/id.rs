//! Common ID Types
//!
//! Type-safe integer ID wrappers for domain entities.
//! IDs are allocated from persisted monotonic counters, so they are
//! plain positive integers on the wire and on disk.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type UserId = Id<markers::User>;
/// let id = UserId::new(7);
/// assert_eq!(id.value(), 7);
/// ```
pub struct Id<T> {
    value: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Wrap a raw integer
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Get the underlying integer
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// The ID that follows this one
    pub const fn next(&self) -> Self {
        Self::new(self.value + 1)
    }
}

// Manual impls: derives would put bounds on the marker type.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T> From<Id<T>> for u64 {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

/// Error returned when a path segment is not a positive integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError;

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ID must be a positive integer")
    }
}

impl std::error::Error for ParseIdError {}

impl<T> FromStr for Id<T> {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(ParseIdError),
            Ok(value) => Ok(Self::new(value)),
        }
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::new)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for User IDs
    pub struct User;

    /// Marker for Course IDs
    pub struct Course;

    /// Marker for Assignment IDs
    pub struct Assignment;
}

/// Type aliases for common IDs
pub type UserId = Id<markers::User>;
pub type CourseId = Id<markers::Course>;
pub type AssignmentId = Id<markers::Assignment>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_type_safety() {
        let user_id: UserId = Id::new(1);
        let course_id: CourseId = Id::new(1);

        // Same value, different types: they cannot be compared directly
        assert_eq!(u64::from(user_id), u64::from(course_id));
    }

    #[test]
    fn test_id_next() {
        let id: AssignmentId = Id::new(41);
        assert_eq!(id.next().value(), 42);
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("12".parse::<CourseId>(), Ok(CourseId::new(12)));
        assert_eq!(" 3 ".parse::<CourseId>(), Ok(CourseId::new(3)));
        assert!("0".parse::<CourseId>().is_err());
        assert!("-1".parse::<CourseId>().is_err());
        assert!("abc".parse::<CourseId>().is_err());
    }

    #[test]
    fn test_id_serde_is_plain_integer() {
        let id = UserId::new(5);
        assert_eq!(serde_json::to_string(&id).unwrap(), "5");

        let back: UserId = serde_json::from_str("5").unwrap();
        assert_eq!(back, id);
    }
}
