//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::{AssignmentId, CourseId, Id, UserId};
use platform::rate_limit::MemoryRateLimitStore;

use crate::application::{
    AssignmentUseCase, ChangePasswordInput, ChangePasswordUseCase, CourseCatalogUseCase,
    CreateCourseInput, DataContext, EnrollmentUseCase, GradeAssignmentInput, LmsConfig,
    LoginInput, LoginUseCase, PasswordService, RegisterInput, RegisterUseCase,
    ResetPasswordUseCase, SubmitAssignmentInput, TokenService, UpdateAssignmentInput,
    UpdateCourseInput, UpdateEmailUseCase,
};
use crate::domain::repository::EntityStore;
use crate::error::{LmsError, LmsResult};
use crate::presentation::dto::{
    AssignmentResponse, AssignmentView, AssignmentsResponse, AuthResponse, ChangePasswordRequest,
    CourseResponse, CoursesResponse, CreateCourseRequest, EmailRequest, GradeAssignmentRequest,
    LoginRequest, MessageResponse, PublicUser, RegisterRequest, SubmitAssignmentRequest,
    UpdateAssignmentRequest, UpdateCourseRequest,
};
use crate::presentation::middleware::{
    AdminAuth, Authenticated, RateLimiter, StudentAuth, ValidJson,
};

pub const AUTH_RATE_LIMIT_MESSAGE: &str = "Too many login attempts, please try again later.";
pub const API_RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Shared state for LMS handlers
pub struct LmsAppState<S> {
    pub data: Arc<DataContext<S>>,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordService>,
    pub rate_limits: Arc<MemoryRateLimitStore>,
    pub auth_limiter: RateLimiter<MemoryRateLimitStore>,
    pub api_limiter: RateLimiter<MemoryRateLimitStore>,
}

// Manual impl: derive would require S: Clone
impl<S> Clone for LmsAppState<S> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            tokens: self.tokens.clone(),
            passwords: self.passwords.clone(),
            rate_limits: self.rate_limits.clone(),
            auth_limiter: self.auth_limiter.clone(),
            api_limiter: self.api_limiter.clone(),
        }
    }
}

impl<S> LmsAppState<S>
where
    S: EntityStore + Send + Sync + 'static,
{
    pub fn new(data: DataContext<S>, config: &LmsConfig) -> LmsResult<Self> {
        let rate_limits = Arc::new(MemoryRateLimitStore::new());

        Ok(Self {
            data: Arc::new(data),
            tokens: Arc::new(TokenService::new(
                config.jwt_secret.as_bytes(),
                config.token_lifetime,
            )),
            passwords: Arc::new(PasswordService::new(config.hash_cost)?),
            auth_limiter: RateLimiter::new(
                rate_limits.clone(),
                config.auth_rate_limit.clone(),
                "auth",
                AUTH_RATE_LIMIT_MESSAGE,
            )
            .trust_forwarded_for(config.trust_proxy),
            api_limiter: RateLimiter::new(
                rate_limits.clone(),
                config.api_rate_limit.clone(),
                "api",
                API_RATE_LIMIT_MESSAGE,
            )
            .trust_forwarded_for(config.trust_proxy),
            rate_limits,
        })
    }
}

impl<S> FromRef<LmsAppState<S>> for Arc<TokenService> {
    fn from_ref(state: &LmsAppState<S>) -> Self {
        state.tokens.clone()
    }
}

/// Parse a path segment as a positive id
fn parse_id<T>(raw: &str, message: &'static str) -> LmsResult<Id<T>> {
    raw.parse().map_err(|_| LmsError::malformed(message))
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/register
pub async fn register<S>(
    State(state): State<LmsAppState<S>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> LmsResult<impl IntoResponse>
where
    S: EntityStore + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.data.clone(),
        state.passwords.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    let (status, message) = if output.created {
        (StatusCode::CREATED, "User registered successfully")
    } else {
        (
            StatusCode::OK,
            "Password updated successfully. You can now login with your new password.",
        )
    };

    Ok((
        status,
        Json(AuthResponse {
            message: message.to_string(),
            user: PublicUser::from(&output.user),
            token: output.token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login<S>(
    State(state): State<LmsAppState<S>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> LmsResult<Json<AuthResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.data.clone(),
        state.passwords.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: PublicUser::from(&output.user),
        token: output.token,
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password<S>(
    State(state): State<LmsAppState<S>>,
    ValidJson(req): ValidJson<EmailRequest>,
) -> LmsResult<Json<MessageResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let message = ResetPasswordUseCase::new(state.data.clone())
        .execute(req.email)
        .await?;
    Ok(Json(MessageResponse::new(message)))
}

/// PUT /api/auth/change-password
pub async fn change_password<S>(
    State(state): State<LmsAppState<S>>,
    Authenticated(identity): Authenticated,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> LmsResult<Json<MessageResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    ChangePasswordUseCase::new(state.data.clone(), state.passwords.clone())
        .execute(
            &identity,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.password,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// PUT /api/auth/update-email
pub async fn update_email<S>(
    State(state): State<LmsAppState<S>>,
    Authenticated(identity): Authenticated,
    ValidJson(req): ValidJson<EmailRequest>,
) -> LmsResult<Json<AuthResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let output = UpdateEmailUseCase::new(state.data.clone(), state.tokens.clone())
        .execute(&identity, req.email)
        .await?;

    Ok(Json(AuthResponse {
        message: "Email updated successfully".to_string(),
        user: PublicUser::from(&output.user),
        token: output.token,
    }))
}

// ============================================================================
// Courses
// ============================================================================

/// GET /api/courses
pub async fn list_courses<S>(State(state): State<LmsAppState<S>>) -> Json<CoursesResponse>
where
    S: EntityStore + Send + Sync + 'static,
{
    let courses = CourseCatalogUseCase::new(state.data.clone()).list().await;
    Json(CoursesResponse { courses })
}

/// GET /api/courses/{id}
pub async fn get_course<S>(
    State(state): State<LmsAppState<S>>,
    Path(id): Path<String>,
) -> LmsResult<Json<CourseResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: CourseId = parse_id(&id, "Invalid course ID")?;
    let course = CourseCatalogUseCase::new(state.data.clone()).get(id).await?;
    Ok(Json(CourseResponse {
        message: None,
        course,
    }))
}

/// POST /api/courses
pub async fn create_course<S>(
    State(state): State<LmsAppState<S>>,
    AdminAuth(identity): AdminAuth,
    ValidJson(req): ValidJson<CreateCourseRequest>,
) -> LmsResult<impl IntoResponse>
where
    S: EntityStore + Send + Sync + 'static,
{
    let course = CourseCatalogUseCase::new(state.data.clone())
        .create(
            &identity,
            CreateCourseInput {
                title: req.title,
                description: req.description,
                category: req.category,
                duration: req.duration,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseResponse {
            message: Some("Course created successfully".to_string()),
            course,
        }),
    ))
}

/// PUT /api/courses/{id}
pub async fn update_course<S>(
    State(state): State<LmsAppState<S>>,
    AdminAuth(identity): AdminAuth,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateCourseRequest>,
) -> LmsResult<Json<CourseResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: CourseId = parse_id(&id, "Invalid course ID")?;
    let course = CourseCatalogUseCase::new(state.data.clone())
        .update(
            &identity,
            id,
            UpdateCourseInput {
                title: req.title,
                description: req.description,
                category: req.category,
                duration: req.duration,
            },
        )
        .await?;

    Ok(Json(CourseResponse {
        message: Some("Course updated successfully".to_string()),
        course,
    }))
}

/// DELETE /api/courses/{id}
pub async fn delete_course<S>(
    State(state): State<LmsAppState<S>>,
    AdminAuth(identity): AdminAuth,
    Path(id): Path<String>,
) -> LmsResult<Json<MessageResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: CourseId = parse_id(&id, "Invalid course ID")?;
    CourseCatalogUseCase::new(state.data.clone())
        .delete(&identity, id)
        .await?;

    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

/// POST /api/courses/{id}/enroll
pub async fn enroll<S>(
    State(state): State<LmsAppState<S>>,
    StudentAuth(identity): StudentAuth,
    Path(id): Path<String>,
) -> LmsResult<Json<MessageResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: CourseId = parse_id(&id, "Invalid course ID")?;
    EnrollmentUseCase::new(state.data.clone())
        .enroll(&identity, id)
        .await?;

    Ok(Json(MessageResponse::new("Enrolled successfully")))
}

// ============================================================================
// Students
// ============================================================================

/// GET /api/students/{id}/courses
pub async fn student_courses<S>(
    State(state): State<LmsAppState<S>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> LmsResult<Json<CoursesResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: UserId = parse_id(&id, "Invalid student ID")?;
    let courses = EnrollmentUseCase::new(state.data.clone())
        .courses_for(&identity, id)
        .await?;

    Ok(Json(CoursesResponse { courses }))
}

/// GET /api/students/{id}/assignments
pub async fn student_assignments<S>(
    State(state): State<LmsAppState<S>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> LmsResult<Json<AssignmentsResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: UserId = parse_id(&id, "Invalid student ID")?;
    let assignments = AssignmentUseCase::new(state.data.clone())
        .for_student(&identity, id)
        .await?;

    Ok(Json(AssignmentsResponse {
        assignments: assignments.into_iter().map(AssignmentView::from).collect(),
    }))
}

// ============================================================================
// Assignments
// ============================================================================

/// POST /api/assignments
pub async fn submit_assignment<S>(
    State(state): State<LmsAppState<S>>,
    StudentAuth(identity): StudentAuth,
    ValidJson(req): ValidJson<SubmitAssignmentRequest>,
) -> LmsResult<impl IntoResponse>
where
    S: EntityStore + Send + Sync + 'static,
{
    let assignment = AssignmentUseCase::new(state.data.clone())
        .submit(
            &identity,
            SubmitAssignmentInput {
                course_id: req.course_id,
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse {
            message: Some("Assignment submitted successfully".to_string()),
            assignment: assignment.into(),
        }),
    ))
}

/// PUT /api/assignments/{id}
pub async fn update_assignment<S>(
    State(state): State<LmsAppState<S>>,
    StudentAuth(identity): StudentAuth,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateAssignmentRequest>,
) -> LmsResult<Json<AssignmentResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: AssignmentId = parse_id(&id, "Invalid assignment ID")?;
    let assignment = AssignmentUseCase::new(state.data.clone())
        .update(
            &identity,
            id,
            UpdateAssignmentInput {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(Json(AssignmentResponse {
        message: Some("Assignment updated successfully".to_string()),
        assignment: assignment.into(),
    }))
}

/// GET /api/assignments
pub async fn list_assignments<S>(
    State(state): State<LmsAppState<S>>,
    AdminAuth(identity): AdminAuth,
) -> LmsResult<Json<AssignmentsResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let assignments = AssignmentUseCase::new(state.data.clone())
        .list_all(&identity)
        .await?;

    Ok(Json(AssignmentsResponse {
        assignments: assignments.into_iter().map(AssignmentView::from).collect(),
    }))
}

/// GET /api/assignments/{id}
pub async fn get_assignment<S>(
    State(state): State<LmsAppState<S>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> LmsResult<Json<AssignmentResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: AssignmentId = parse_id(&id, "Invalid assignment ID")?;
    let assignment = AssignmentUseCase::new(state.data.clone())
        .get(&identity, id)
        .await?;

    Ok(Json(AssignmentResponse {
        message: None,
        assignment: assignment.into(),
    }))
}

/// PUT /api/assignments/{id}/grade
pub async fn grade_assignment<S>(
    State(state): State<LmsAppState<S>>,
    AdminAuth(identity): AdminAuth,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<GradeAssignmentRequest>,
) -> LmsResult<Json<AssignmentResponse>>
where
    S: EntityStore + Send + Sync + 'static,
{
    let id: AssignmentId = parse_id(&id, "Invalid assignment ID")?;
    let graded = AssignmentUseCase::new(state.data.clone())
        .grade(
            &identity,
            id,
            GradeAssignmentInput {
                score: req.score,
                feedback: req.feedback,
            },
        )
        .await?;

    Ok(Json(AssignmentResponse {
        message: Some("Assignment graded successfully".to_string()),
        assignment: graded.into(),
    }))
}

/// Fallback for unknown routes
pub async fn not_found() -> LmsError {
    LmsError::RouteNotFound
}
