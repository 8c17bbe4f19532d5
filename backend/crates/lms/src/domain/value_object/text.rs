//! Length-bounded free text (titles, descriptions, content, feedback)

use std::ops::RangeInclusive;

use crate::error::{LmsError, LmsResult};

/// Trim `raw` and require its character count to fall in `bounds`
///
/// `label` is the human-readable field name used in the message,
/// e.g. "Title must be between 3 and 200 characters".
pub fn bounded(
    field: &'static str,
    label: &str,
    raw: &str,
    bounds: RangeInclusive<usize>,
) -> LmsResult<String> {
    let value = raw.trim();
    let len = value.chars().count();

    if !bounds.contains(&len) {
        let message = if *bounds.start() == 0 {
            format!("{label} must be at most {} characters", bounds.end())
        } else {
            format!(
                "{label} must be between {} and {} characters",
                bounds.start(),
                bounds.end()
            )
        };
        return Err(LmsError::validation(field, message));
    }

    Ok(value.to_string())
}

pub const COURSE_TITLE: RangeInclusive<usize> = 3..=200;
pub const COURSE_DESCRIPTION: RangeInclusive<usize> = 10..=2000;
pub const ASSIGNMENT_TITLE: RangeInclusive<usize> = 1..=200;
pub const ASSIGNMENT_CONTENT: RangeInclusive<usize> = 10..=10_000;
pub const FEEDBACK: RangeInclusive<usize> = 0..=2000;
