//! LMS (Learning Management) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, entity store trait
//! - `application/` - Use cases, tokens, access control
//! - `infra/` - JSON file and in-memory stores
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Student / admin accounts with bearer tokens
//! - Course catalog with cascade delete
//! - Enrollments, assignment submission and grading
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - HS256 tokens carrying id, email and role
//! - Per-client rate limits on auth and API routes

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::LmsConfig;
pub use application::context::DataContext;
pub use error::{LmsError, LmsResult};
pub use infra::json_file::JsonFileStore;
pub use infra::memory::InMemoryStore;
pub use presentation::handlers::LmsAppState;
pub use presentation::router::lms_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::{Assignment, Course, Enrollment, User};
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
