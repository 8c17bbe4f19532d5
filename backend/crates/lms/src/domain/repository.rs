//! Entity Store
//!
//! Four independent collections plus the id counters. Every save replaces a
//! whole collection; there are no partial updates.

use kernel::id::{AssignmentId, CourseId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    assignment::Assignment, course::Course, enrollment::Enrollment, user::User,
};
use crate::domain::value_object::Email;
use crate::error::LmsResult;

// ============================================================================
// Counters
// ============================================================================

/// Next id to hand out per entity kind. Persisted so restarts never reuse ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub next_user_id: u64,
    pub next_course_id: u64,
    pub next_assignment_id: u64,
}

impl Default for Counters {
    /// Courses 1-4 belong to the seeded catalog
    fn default() -> Self {
        Self {
            next_user_id: 1,
            next_course_id: 5,
            next_assignment_id: 1,
        }
    }
}

impl Counters {
    pub fn allocate_user_id(&mut self) -> UserId {
        let id = UserId::new(self.next_user_id);
        self.next_user_id += 1;
        id
    }

    pub fn allocate_course_id(&mut self) -> CourseId {
        let id = CourseId::new(self.next_course_id);
        self.next_course_id += 1;
        id
    }

    pub fn allocate_assignment_id(&mut self) -> AssignmentId {
        let id = AssignmentId::new(self.next_assignment_id);
        self.next_assignment_id += 1;
        id
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Everything the store holds, loaded at once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
    pub assignments: Vec<Assignment>,
    pub counters: Counters,
}

impl Snapshot {
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Case-insensitive lookup
    pub fn user_by_email(&self, email: &Email) -> Option<&User> {
        self.users.iter().find(|u| email.matches(&u.email))
    }

    pub fn user_by_email_mut(&mut self, email: &Email) -> Option<&mut User> {
        self.users.iter_mut().find(|u| email.matches(&u.email))
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn course_mut(&mut self, id: CourseId) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == id)
    }

    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn assignment_mut(&mut self, id: AssignmentId) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|a| a.id == id)
    }

    pub fn is_enrolled(&self, student_id: UserId, course_id: CourseId) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.is_for(student_id, course_id))
    }

    /// Raise counters past every id already in use
    ///
    /// Returns `true` when a counter moved.
    pub fn reconcile_counters(&mut self) -> bool {
        let before = self.counters;

        let max_user = self.users.iter().map(|u| u.id.value()).max().unwrap_or(0);
        let max_course = self.courses.iter().map(|c| c.id.value()).max().unwrap_or(0);
        let max_assignment = self
            .assignments
            .iter()
            .map(|a| a.id.value())
            .max()
            .unwrap_or(0);

        let counters = &mut self.counters;
        counters.next_user_id = counters.next_user_id.max(max_user + 1);
        counters.next_course_id = counters.next_course_id.max(max_course + 1);
        counters.next_assignment_id = counters.next_assignment_id.max(max_assignment + 1);

        self.counters != before
    }

    /// Collections whose contents differ between `self` and `other`
    pub fn changed_since(&self, other: &Snapshot) -> Vec<CollectionName> {
        CollectionName::ALL
            .into_iter()
            .filter(|name| match name {
                CollectionName::Users => self.users != other.users,
                CollectionName::Courses => self.courses != other.courses,
                CollectionName::Enrollments => self.enrollments != other.enrollments,
                CollectionName::Assignments => self.assignments != other.assignments,
                CollectionName::Counters => self.counters != other.counters,
            })
            .collect()
    }

    pub fn collection(&self, name: CollectionName) -> Collection<'_> {
        match name {
            CollectionName::Users => Collection::Users(&self.users),
            CollectionName::Courses => Collection::Courses(&self.courses),
            CollectionName::Enrollments => Collection::Enrollments(&self.enrollments),
            CollectionName::Assignments => Collection::Assignments(&self.assignments),
            CollectionName::Counters => Collection::Counters(&self.counters),
        }
    }
}

// ============================================================================
// Collections
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    Users,
    Courses,
    Enrollments,
    Assignments,
    Counters,
}

impl CollectionName {
    /// Write order for multi-collection mutations
    pub const ALL: [CollectionName; 5] = [
        CollectionName::Users,
        CollectionName::Courses,
        CollectionName::Enrollments,
        CollectionName::Assignments,
        CollectionName::Counters,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Users => "users",
            CollectionName::Courses => "courses",
            CollectionName::Enrollments => "enrollments",
            CollectionName::Assignments => "assignments",
            CollectionName::Counters => "counters",
        }
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A full collection handed to [`LocalEntityStore::save`]
#[derive(Debug, Clone, Copy)]
pub enum Collection<'a> {
    Users(&'a [User]),
    Courses(&'a [Course]),
    Enrollments(&'a [Enrollment]),
    Assignments(&'a [Assignment]),
    Counters(&'a Counters),
}

impl Collection<'_> {
    pub fn name(&self) -> CollectionName {
        match self {
            Collection::Users(_) => CollectionName::Users,
            Collection::Courses(_) => CollectionName::Courses,
            Collection::Enrollments(_) => CollectionName::Enrollments,
            Collection::Assignments(_) => CollectionName::Assignments,
            Collection::Counters(_) => CollectionName::Counters,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Collection::Users(items) => serde_json::to_vec_pretty(items),
            Collection::Courses(items) => serde_json::to_vec_pretty(items),
            Collection::Enrollments(items) => serde_json::to_vec_pretty(items),
            Collection::Assignments(items) => serde_json::to_vec_pretty(items),
            Collection::Counters(counters) => serde_json::to_vec_pretty(counters),
        }
    }
}

// ============================================================================
// Store trait
// ============================================================================

/// Durable storage for the LMS collections
///
/// Read failures degrade to defaults inside `load`; write failures are
/// returned to the caller.
#[trait_variant::make(EntityStore: Send)]
pub trait LocalEntityStore {
    /// Read all collections
    async fn load(&self) -> LmsResult<Snapshot>;

    /// Replace one collection
    async fn save(&self, collection: Collection<'_>) -> LmsResult<()>;
}
