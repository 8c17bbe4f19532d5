//! Domain Layer
//!
//! Contains entities, value objects, and the entity store trait.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{assignment::Assignment, course::Course, enrollment::Enrollment, user::User};
pub use repository::{Collection, CollectionName, Counters, EntityStore, Snapshot};
