//! Assignment Use Case
//!
//! - Submit (student, must be enrolled)
//! - Update (owning student, until graded)
//! - Grade (admin, exactly once, from submitted)
//! - Reads scoped to the owning student or an admin

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{AssignmentId, CourseId, UserId};

use crate::application::access::{require_role, require_self_or_admin};
use crate::application::context::DataContext;
use crate::application::token::Identity;
use crate::domain::Assignment;
use crate::domain::repository::{EntityStore, Snapshot};
use crate::domain::value_object::text::{self, ASSIGNMENT_CONTENT, ASSIGNMENT_TITLE, FEEDBACK};
use crate::domain::value_object::{Score, UserRole};
use crate::error::{LmsError, LmsResult};

pub const UNKNOWN_COURSE: &str = "Unknown Course";
pub const UNKNOWN_STUDENT: &str = "Unknown Student";
pub const UNKNOWN_EMAIL: &str = "Unknown Email";

/// Submit assignment input
pub struct SubmitAssignmentInput {
    pub course_id: i64,
    pub title: String,
    pub content: String,
}

/// Update assignment input. Absent fields are left unchanged.
#[derive(Default)]
pub struct UpdateAssignmentInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Grade assignment input
pub struct GradeAssignmentInput {
    pub score: Option<i64>,
    pub feedback: Option<String>,
}

/// Who submitted an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSummary {
    pub name: String,
    pub email: String,
}

/// Assignment with display fields looked up from other collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedAssignment {
    pub assignment: Assignment,
    pub course_title: Option<String>,
    pub student: Option<StudentSummary>,
}

impl EnrichedAssignment {
    fn plain(assignment: Assignment) -> Self {
        Self {
            assignment,
            course_title: None,
            student: None,
        }
    }

    fn with_course(data: &Snapshot, assignment: Assignment) -> Self {
        let course_title = data
            .course(assignment.course_id)
            .map_or_else(|| UNKNOWN_COURSE.to_string(), |c| c.title.clone());
        Self {
            assignment,
            course_title: Some(course_title),
            student: None,
        }
    }

    fn full(data: &Snapshot, assignment: Assignment) -> Self {
        let student = match data.user(assignment.student_id) {
            Some(user) => StudentSummary {
                name: user.name.clone(),
                email: user.email.as_str().to_string(),
            },
            None => StudentSummary {
                name: UNKNOWN_STUDENT.to_string(),
                email: UNKNOWN_EMAIL.to_string(),
            },
        };
        Self {
            student: Some(student),
            ..Self::with_course(data, assignment)
        }
    }
}

pub struct AssignmentUseCase<S> {
    data: Arc<DataContext<S>>,
}

impl<S> AssignmentUseCase<S>
where
    S: EntityStore + Sync,
{
    pub fn new(data: Arc<DataContext<S>>) -> Self {
        Self { data }
    }

    pub async fn submit(
        &self,
        identity: &Identity,
        input: SubmitAssignmentInput,
    ) -> LmsResult<Assignment> {
        require_role(identity, UserRole::Student)?;

        if input.course_id < 1 {
            return Err(LmsError::validation(
                "courseId",
                "Course ID must be a valid number",
            ));
        }
        let course_id = CourseId::new(input.course_id as u64);
        let title = text::bounded("title", "Title", &input.title, ASSIGNMENT_TITLE)?;
        let content = text::bounded("content", "Content", &input.content, ASSIGNMENT_CONTENT)?;
        let student_id = identity.id;

        let assignment = self
            .data
            .mutate(move |data| {
                if !data.is_enrolled(student_id, course_id) {
                    return Err(LmsError::NotEnrolled);
                }

                let id = data.counters.allocate_assignment_id();
                let assignment =
                    Assignment::submit(id, student_id, course_id, title, content, Utc::now());
                data.assignments.push(assignment.clone());
                Ok(assignment)
            })
            .await?;

        tracing::info!(
            assignment_id = %assignment.id,
            student_id = %student_id,
            course_id = %course_id,
            "Assignment submitted"
        );
        Ok(assignment)
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: AssignmentId,
        input: UpdateAssignmentInput,
    ) -> LmsResult<Assignment> {
        require_role(identity, UserRole::Student)?;

        let title = input
            .title
            .map(|t| text::bounded("title", "Title", &t, ASSIGNMENT_TITLE))
            .transpose()?;
        let content = input
            .content
            .map(|c| text::bounded("content", "Content", &c, ASSIGNMENT_CONTENT))
            .transpose()?;
        let caller = identity.id;

        let assignment = self
            .data
            .mutate(move |data| {
                let assignment = data.assignment_mut(id).ok_or(LmsError::AssignmentNotFound)?;
                if !assignment.is_owned_by(caller) {
                    return Err(LmsError::Forbidden(
                        "You can only update your own assignments",
                    ));
                }
                assignment.revise(title, content, Utc::now())?;
                Ok(assignment.clone())
            })
            .await?;

        tracing::info!(assignment_id = %id, "Assignment updated");
        Ok(assignment)
    }

    pub async fn grade(
        &self,
        identity: &Identity,
        id: AssignmentId,
        input: GradeAssignmentInput,
    ) -> LmsResult<EnrichedAssignment> {
        require_role(identity, UserRole::Admin)?;

        let score = input
            .score
            .ok_or_else(|| LmsError::validation("score", "Score must be between 0 and 100"))
            .and_then(Score::new)?;
        let feedback = match input.feedback {
            Some(raw) => text::bounded("feedback", "Feedback", &raw, FEEDBACK)?,
            None => String::new(),
        };
        let grader = identity.id;

        let graded = self
            .data
            .mutate(move |data| {
                let assignment = data.assignment_mut(id).ok_or(LmsError::AssignmentNotFound)?;
                assignment.grade(score, feedback, grader, Utc::now())?;
                let assignment = assignment.clone();
                Ok(EnrichedAssignment::full(data, assignment))
            })
            .await?;

        tracing::info!(
            assignment_id = %id,
            graded_by = %grader,
            score = score.value(),
            "Assignment graded"
        );
        Ok(graded)
    }

    /// Every assignment, admin only
    pub async fn list_all(&self, identity: &Identity) -> LmsResult<Vec<EnrichedAssignment>> {
        require_role(identity, UserRole::Admin)?;

        Ok(self
            .data
            .read(|data| {
                data.assignments
                    .iter()
                    .map(|a| EnrichedAssignment::full(data, a.clone()))
                    .collect()
            })
            .await)
    }

    /// One assignment. Admins see student and course details.
    pub async fn get(&self, identity: &Identity, id: AssignmentId) -> LmsResult<EnrichedAssignment> {
        let is_admin = identity.is_admin();

        let (assignment, enriched) = self
            .data
            .read(|data| {
                data.assignment(id).cloned().map(|a| {
                    let enriched = is_admin.then(|| EnrichedAssignment::full(data, a.clone()));
                    (a, enriched)
                })
            })
            .await
            .ok_or(LmsError::AssignmentNotFound)?;

        require_self_or_admin(identity, assignment.student_id)?;
        Ok(enriched.unwrap_or_else(|| EnrichedAssignment::plain(assignment)))
    }

    /// A student's assignments with course titles
    pub async fn for_student(
        &self,
        identity: &Identity,
        student_id: UserId,
    ) -> LmsResult<Vec<EnrichedAssignment>> {
        require_self_or_admin(identity, student_id)?;

        Ok(self
            .data
            .read(|data| {
                data.assignments
                    .iter()
                    .filter(|a| a.student_id == student_id)
                    .map(|a| EnrichedAssignment::with_course(data, a.clone()))
                    .collect()
            })
            .await)
    }
}
