//! Enrollment Entity
//!
//! Join record between a student and a course. `(student_id, course_id)` is unique.

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: UserId,
    pub course_id: CourseId,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(student_id: UserId, course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            student_id,
            course_id,
            enrolled_at: now,
        }
    }

    #[inline]
    pub fn is_for(&self, student_id: UserId, course_id: CourseId) -> bool {
        self.student_id == student_id && self.course_id == course_id
    }
}
