//! Course Catalog Use Case
//!
//! Public reads, admin-only writes. Deleting a course removes its
//! enrollments and assignments in the same transaction.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::CourseId;

use crate::application::access::require_role;
use crate::application::context::DataContext;
use crate::application::token::Identity;
use crate::domain::Course;
use crate::domain::repository::EntityStore;
use crate::domain::value_object::text::{self, COURSE_DESCRIPTION, COURSE_TITLE};
use crate::domain::value_object::{CourseCategory, CourseDuration, UserRole};
use crate::error::{LmsError, LmsResult};

/// Create course input
pub struct CreateCourseInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: i64,
}

/// Update course input. Absent fields are left unchanged.
#[derive(Default)]
pub struct UpdateCourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration: Option<i64>,
}

/// What a course deletion removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseDeletion {
    pub enrollments_removed: usize,
    pub assignments_removed: usize,
}

pub struct CourseCatalogUseCase<S> {
    data: Arc<DataContext<S>>,
}

impl<S> CourseCatalogUseCase<S>
where
    S: EntityStore + Sync,
{
    pub fn new(data: Arc<DataContext<S>>) -> Self {
        Self { data }
    }

    pub async fn list(&self) -> Vec<Course> {
        self.data.read(|data| data.courses.clone()).await
    }

    pub async fn get(&self, id: CourseId) -> LmsResult<Course> {
        self.data
            .read(|data| data.course(id).cloned())
            .await
            .ok_or(LmsError::CourseNotFound)
    }

    pub async fn create(&self, identity: &Identity, input: CreateCourseInput) -> LmsResult<Course> {
        require_role(identity, UserRole::Admin)?;

        let title = text::bounded("title", "Title", &input.title, COURSE_TITLE)?;
        let description =
            text::bounded("description", "Description", &input.description, COURSE_DESCRIPTION)?;
        let category: CourseCategory = input.category.parse()?;
        let duration = CourseDuration::new(input.duration)?;

        let course = self
            .data
            .mutate(move |data| {
                let id = data.counters.allocate_course_id();
                let course = Course::new(id, title, description, category, duration, Utc::now());
                data.courses.push(course.clone());
                Ok(course)
            })
            .await?;

        tracing::info!(course_id = %course.id, title = %course.title, "Course created");
        Ok(course)
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: CourseId,
        input: UpdateCourseInput,
    ) -> LmsResult<Course> {
        require_role(identity, UserRole::Admin)?;

        let title = input
            .title
            .map(|t| text::bounded("title", "Title", &t, COURSE_TITLE))
            .transpose()?;
        let description = input
            .description
            .map(|d| text::bounded("description", "Description", &d, COURSE_DESCRIPTION))
            .transpose()?;
        let category = input
            .category
            .map(|c| c.parse::<CourseCategory>())
            .transpose()?;
        let duration = input.duration.map(CourseDuration::new).transpose()?;

        let course = self
            .data
            .mutate(move |data| {
                let course = data.course_mut(id).ok_or(LmsError::CourseNotFound)?;
                if let Some(title) = title {
                    course.title = title;
                }
                if let Some(description) = description {
                    course.description = description;
                }
                if let Some(category) = category {
                    course.category = category;
                }
                if let Some(duration) = duration {
                    course.duration = duration.hours();
                }
                Ok(course.clone())
            })
            .await?;

        tracing::info!(course_id = %course.id, "Course updated");
        Ok(course)
    }

    pub async fn delete(&self, identity: &Identity, id: CourseId) -> LmsResult<CourseDeletion> {
        require_role(identity, UserRole::Admin)?;

        let deletion = self
            .data
            .mutate(move |data| {
                let before = data.courses.len();
                data.courses.retain(|c| c.id != id);
                if data.courses.len() == before {
                    return Err(LmsError::CourseNotFound);
                }

                let enrollments = data.enrollments.len();
                data.enrollments.retain(|e| e.course_id != id);
                let assignments = data.assignments.len();
                data.assignments.retain(|a| a.course_id != id);

                Ok(CourseDeletion {
                    enrollments_removed: enrollments - data.enrollments.len(),
                    assignments_removed: assignments - data.assignments.len(),
                })
            })
            .await?;

        tracing::info!(
            course_id = %id,
            enrollments_removed = deletion.enrollments_removed,
            assignments_removed = deletion.assignments_removed,
            "Course deleted"
        );
        Ok(deletion)
    }
}
