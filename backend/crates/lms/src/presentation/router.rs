//! LMS Router

use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
    middleware,
    routing::{get, post, put},
};
use platform::rate_limit::MemoryRateLimitStore;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::domain::repository::EntityStore;
use crate::presentation::handlers::{self, LmsAppState};
use crate::presentation::middleware::rate_limit;

/// Headers set on every response unless a handler already chose one
const SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=15552000; includeSubDomains",
    ),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'self'; frame-ancestors 'self'; object-src 'none'",
    ),
];

/// Build the full `/api` router over any entity store
///
/// Register, login and reset-password share the strict auth window.
/// Every other route counts against the general API window.
/// Every response, including errors and 404s, carries [`SECURITY_HEADERS`].
pub fn lms_router<S>(state: LmsAppState<S>) -> Router
where
    S: EntityStore + Send + Sync + 'static,
{
    let auth = Router::new()
        .route("/api/auth/register", post(handlers::register::<S>))
        .route("/api/auth/login", post(handlers::login::<S>))
        .route("/api/auth/reset-password", post(handlers::reset_password::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.auth_limiter.clone(),
            rate_limit::<MemoryRateLimitStore>,
        ));

    let api = Router::new()
        .route("/api/auth/change-password", put(handlers::change_password::<S>))
        .route("/api/auth/update-email", put(handlers::update_email::<S>))
        .route(
            "/api/courses",
            get(handlers::list_courses::<S>).post(handlers::create_course::<S>),
        )
        .route(
            "/api/courses/{id}",
            get(handlers::get_course::<S>)
                .put(handlers::update_course::<S>)
                .delete(handlers::delete_course::<S>),
        )
        .route("/api/courses/{id}/enroll", post(handlers::enroll::<S>))
        .route(
            "/api/students/{id}/courses",
            get(handlers::student_courses::<S>),
        )
        .route(
            "/api/students/{id}/assignments",
            get(handlers::student_assignments::<S>),
        )
        .route(
            "/api/assignments",
            get(handlers::list_assignments::<S>).post(handlers::submit_assignment::<S>),
        )
        .route(
            "/api/assignments/{id}",
            get(handlers::get_assignment::<S>).put(handlers::update_assignment::<S>),
        )
        .route(
            "/api/assignments/{id}/grade",
            put(handlers::grade_assignment::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.api_limiter.clone(),
            rate_limit::<MemoryRateLimitStore>,
        ));

    let router = auth
        .merge(api)
        .fallback(handlers::not_found)
        .with_state(state);

    with_security_headers(router)
}

fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                name,
                HeaderValue::from_static(value),
            ))
        })
}
