//! Application Layer
//!
//! Use cases and application services.

pub mod access;
pub mod assignments;
pub mod config;
pub mod context;
pub mod courses;
pub mod credentials;
pub mod enrollment;
pub mod login;
pub mod password;
pub mod register;
pub mod token;
pub mod update_email;

// Re-exports
pub use assignments::{
    AssignmentUseCase, EnrichedAssignment, GradeAssignmentInput, StudentSummary,
    SubmitAssignmentInput, UpdateAssignmentInput,
};
pub use config::{ConfigError, Environment, LmsConfig};
pub use context::DataContext;
pub use courses::{CourseCatalogUseCase, CourseDeletion, CreateCourseInput, UpdateCourseInput};
pub use credentials::PasswordService;
pub use enrollment::EnrollmentUseCase;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use password::{ChangePasswordInput, ChangePasswordUseCase, ResetPasswordUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use token::{Identity, TokenService};
pub use update_email::{UpdateEmailOutput, UpdateEmailUseCase};
