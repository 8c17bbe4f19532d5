//! Enrollment Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{CourseId, UserId};

use crate::application::access::{require_role, require_self_or_admin};
use crate::application::context::DataContext;
use crate::application::token::Identity;
use crate::domain::repository::EntityStore;
use crate::domain::value_object::UserRole;
use crate::domain::{Course, Enrollment};
use crate::error::{LmsError, LmsResult};

pub struct EnrollmentUseCase<S> {
    data: Arc<DataContext<S>>,
}

impl<S> EnrollmentUseCase<S>
where
    S: EntityStore + Sync,
{
    pub fn new(data: Arc<DataContext<S>>) -> Self {
        Self { data }
    }

    /// Enroll the calling student. At most once per course.
    pub async fn enroll(&self, identity: &Identity, course_id: CourseId) -> LmsResult<Enrollment> {
        require_role(identity, UserRole::Student)?;
        let student_id = identity.id;

        let enrollment = self
            .data
            .mutate(move |data| {
                if data.course(course_id).is_none() {
                    return Err(LmsError::CourseNotFound);
                }
                if data.is_enrolled(student_id, course_id) {
                    return Err(LmsError::AlreadyEnrolled);
                }

                let enrollment = Enrollment::new(student_id, course_id, Utc::now());
                data.enrollments.push(enrollment.clone());
                Ok(enrollment)
            })
            .await?;

        tracing::info!(student_id = %student_id, course_id = %course_id, "Student enrolled");
        Ok(enrollment)
    }

    /// Courses a student is enrolled in, in enrollment order
    pub async fn courses_for(&self, identity: &Identity, student_id: UserId) -> LmsResult<Vec<Course>> {
        require_self_or_admin(identity, student_id)?;

        Ok(self
            .data
            .read(|data| {
                data.enrollments
                    .iter()
                    .filter(|e| e.student_id == student_id)
                    .filter_map(|e| data.course(e.course_id).cloned())
                    .collect()
            })
            .await)
    }
}
