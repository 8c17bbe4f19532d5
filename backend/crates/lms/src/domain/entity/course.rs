//! Course Entity

use chrono::{DateTime, Utc};
use kernel::id::CourseId;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{CourseCategory, CourseDuration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub category: CourseCategory,
    /// Hours
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    pub fn new(
        id: CourseId,
        title: String,
        description: String,
        category: CourseCategory,
        duration: CourseDuration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            category,
            duration: duration.hours(),
            created_at: Some(now),
        }
    }

    /// Catalog written on first start
    pub fn default_catalog(now: DateTime<Utc>) -> Vec<Course> {
        let seed = [
            (
                "Introduction to Web Development",
                "Learn the fundamentals of HTML, CSS, and JavaScript to build modern web applications.",
                CourseCategory::Programming,
                40,
            ),
            (
                "UI/UX Design Principles",
                "Master the art of creating beautiful and user-friendly interfaces.",
                CourseCategory::Design,
                30,
            ),
            (
                "Business Management Fundamentals",
                "Essential skills for managing teams and projects effectively.",
                CourseCategory::Business,
                35,
            ),
            (
                "English for Professionals",
                "Improve your English communication skills for the workplace.",
                CourseCategory::Language,
                50,
            ),
        ];

        seed.into_iter()
            .zip(1u64..)
            .map(|((title, description, category, duration), id)| Course {
                id: CourseId::new(id),
                title: title.to_string(),
                description: description.to_string(),
                category,
                duration,
                created_at: Some(now),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = Course::default_catalog(Utc::now());
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog[0].id.value(), 1);
        assert_eq!(catalog[0].category, CourseCategory::Programming);
        assert_eq!(catalog[3].id.value(), 4);
        assert_eq!(catalog[3].duration, 50);
    }
}
