//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::LmsAppState;
pub use middleware::{AdminAuth, Authenticated, RateLimiter, StudentAuth, ValidJson, rate_limit};
pub use router::lms_router;
