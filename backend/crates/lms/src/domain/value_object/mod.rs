//! Value Object Module

pub mod assignment_status;
pub mod course_category;
pub mod email;
pub mod score;
pub mod text;
pub mod user_name;
pub mod user_role;

pub use assignment_status::AssignmentStatus;
pub use course_category::CourseCategory;
pub use email::Email;
pub use score::{CourseDuration, Score};
pub use user_name::UserName;
pub use user_role::UserRole;
