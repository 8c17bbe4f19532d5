//! Assignment Entity
//!
//! ## 状態遷移
//! - 提出時に `submitted` で作成される
//! - `graded` になるまでは所有する学生が何度でも修正できる（修正で `submitted` に戻る）
//! - 採点は `submitted` からの一度きり。`graded` からは戻らない

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, CourseId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{AssignmentStatus, Score};
use crate::error::{LmsError, LmsResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub title: String,
    pub content: String,
    pub status: AssignmentStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_by: Option<UserId>,
}

impl Assignment {
    pub fn submit(
        id: AssignmentId,
        student_id: UserId,
        course_id: CourseId,
        title: String,
        content: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student_id,
            course_id,
            title,
            content,
            status: AssignmentStatus::Submitted,
            submitted_at: now,
            score: None,
            feedback: None,
            graded_at: None,
            graded_by: None,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.student_id == user_id
    }

    /// Overwrite title/content and resubmit
    pub fn revise(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        now: DateTime<Utc>,
    ) -> LmsResult<()> {
        if self.status.is_graded() {
            return Err(LmsError::AssignmentLocked);
        }

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        self.status = AssignmentStatus::Submitted;
        self.submitted_at = now;
        Ok(())
    }

    pub fn grade(
        &mut self,
        score: Score,
        feedback: String,
        grader: UserId,
        now: DateTime<Utc>,
    ) -> LmsResult<()> {
        match self.status {
            AssignmentStatus::Graded => return Err(LmsError::AlreadyGraded),
            AssignmentStatus::Pending => return Err(LmsError::NotSubmitted),
            AssignmentStatus::Submitted => {}
        }

        self.status = AssignmentStatus::Graded;
        self.score = Some(score);
        self.feedback = Some(feedback);
        self.graded_at = Some(now);
        self.graded_by = Some(grader);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> Assignment {
        Assignment::submit(
            AssignmentId::new(1),
            UserId::new(7),
            CourseId::new(1),
            "Essay".to_string(),
            "Some content here".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_grade_once() {
        let mut assignment = submitted();
        let admin = UserId::new(1);

        assignment
            .grade(Score::new(90).unwrap(), String::new(), admin, Utc::now())
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Graded);
        assert_eq!(assignment.score, Some(Score::new(90).unwrap()));
        assert_eq!(assignment.graded_by, Some(admin));
        assert!(assignment.graded_at.is_some());

        let again = assignment.grade(Score::new(50).unwrap(), String::new(), admin, Utc::now());
        assert!(matches!(again, Err(LmsError::AlreadyGraded)));
        assert_eq!(assignment.score, Some(Score::new(90).unwrap()));
    }

    #[test]
    fn test_pending_cannot_be_graded() {
        let mut assignment = submitted();
        assignment.status = AssignmentStatus::Pending;

        let result = assignment.grade(Score::new(10).unwrap(), String::new(), UserId::new(1), Utc::now());
        assert!(matches!(result, Err(LmsError::NotSubmitted)));
    }

    #[test]
    fn test_revise_resubmits() {
        let mut assignment = submitted();
        assignment.status = AssignmentStatus::Pending;
        let later = assignment.submitted_at + chrono::Duration::seconds(5);

        assignment.revise(Some("New title".into()), None, later).unwrap();
        assert_eq!(assignment.title, "New title");
        assert_eq!(assignment.content, "Some content here");
        assert_eq!(assignment.status, AssignmentStatus::Submitted);
        assert_eq!(assignment.submitted_at, later);
    }

    #[test]
    fn test_graded_is_locked() {
        let mut assignment = submitted();
        assignment
            .grade(Score::new(70).unwrap(), "ok".into(), UserId::new(1), Utc::now())
            .unwrap();

        let result = assignment.revise(None, Some("changed content".into()), Utc::now());
        assert!(matches!(result, Err(LmsError::AssignmentLocked)));
        assert_eq!(assignment.content, "Some content here");
    }

    #[test]
    fn test_optional_fields_omitted() {
        let value = serde_json::to_value(submitted()).unwrap();
        assert_eq!(value["status"], "submitted");
        assert!(value.get("score").is_none());
        assert!(value.get("gradedBy").is_none());
    }
}
