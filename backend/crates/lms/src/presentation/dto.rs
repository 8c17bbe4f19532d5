//! API DTOs (Data Transfer Objects)
//!
//! Request fields default to empty so a missing field is reported by the
//! field validator rather than as an unreadable body.

use serde::{Deserialize, Serialize};

use crate::application::{EnrichedAssignment, StudentSummary};
use crate::domain::{Assignment, Course, User};

// ============================================================================
// Users
// ============================================================================

/// User as returned to clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name.clone(),
            email: user.email.as_str().to_string(),
            role: user.role.code().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    /// New password
    pub password: String,
}

/// Register / login / update-email response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

// ============================================================================
// Courses
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoursesResponse {
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub course: Course,
}

// ============================================================================
// Assignments
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitAssignmentRequest {
    pub course_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradeAssignmentRequest {
    pub score: Option<i64>,
    pub feedback: Option<String>,
}

/// Assignment plus whichever display fields the caller may see
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
}

impl From<EnrichedAssignment> for AssignmentView {
    fn from(enriched: EnrichedAssignment) -> Self {
        let (student_name, student_email) = match enriched.student {
            Some(StudentSummary { name, email }) => (Some(name), Some(email)),
            None => (None, None),
        };
        Self {
            assignment: enriched.assignment,
            course_title: enriched.course_title,
            student_name,
            student_email,
        }
    }
}

impl From<Assignment> for AssignmentView {
    fn from(assignment: Assignment) -> Self {
        Self {
            assignment,
            course_title: None,
            student_name: None,
            student_email: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentsResponse {
    pub assignments: Vec<AssignmentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub assignment: AssignmentView,
}
