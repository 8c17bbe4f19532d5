//! LMS Middleware and Extractors
//!
//! - `Authenticated` / `AdminAuth` / `StudentAuth`: bearer-token extractors
//! - `ValidJson`: JSON body extractor whose rejections are validation errors
//! - `rate_limit`: per-client fixed-window limiter

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{ConnectInfo, FromRef, FromRequest, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::{ClientAddressSource, client_key};
use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore, now_ms};
use serde::de::DeserializeOwned;

use crate::application::access::{authenticate, require_role};
use crate::application::{Identity, TokenService};
use crate::domain::value_object::UserRole;
use crate::error::LmsError;

// ============================================================================
// Authentication extractors
// ============================================================================

/// Any caller holding a valid bearer token
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LmsError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        authenticate(&tokens, authorization).map(Authenticated)
    }
}

/// Authenticated admin
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Identity);

impl<S> FromRequestParts<S> for AdminAuth
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LmsError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(identity) = Authenticated::from_request_parts(parts, state).await?;
        require_role(&identity, UserRole::Admin)?;
        Ok(AdminAuth(identity))
    }
}

/// Authenticated student
#[derive(Debug, Clone)]
pub struct StudentAuth(pub Identity);

impl<S> FromRequestParts<S> for StudentAuth
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LmsError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(identity) = Authenticated::from_request_parts(parts, state).await?;
        require_role(&identity, UserRole::Student)?;
        Ok(StudentAuth(identity))
    }
}

// ============================================================================
// JSON body
// ============================================================================

/// `Json<T>` with every rejection mapped to a 400 validation error
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = LmsError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| ValidJson(value))
            .map_err(|rejection| {
                LmsError::malformed(format!("Invalid request body: {}", rejection.body_text()))
            })
    }
}

// ============================================================================
// Rate limiting
// ============================================================================

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// One limiter window bound to a shared store
pub struct RateLimiter<R> {
    store: Arc<R>,
    config: RateLimitConfig,
    /// Key prefix separating windows that share a store
    scope: &'static str,
    message: &'static str,
    address_source: ClientAddressSource,
}

// Manual impl: derive would require R: Clone
impl<R> Clone for RateLimiter<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            scope: self.scope,
            message: self.message,
            address_source: self.address_source,
        }
    }
}

impl<R> RateLimiter<R> {
    pub fn new(
        store: Arc<R>,
        config: RateLimitConfig,
        scope: &'static str,
        message: &'static str,
    ) -> Self {
        Self {
            store,
            config,
            scope,
            message,
            address_source: ClientAddressSource::Peer,
        }
    }

    /// Key on the first X-Forwarded-For entry instead of the socket peer
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.address_source = if trust {
            ClientAddressSource::ForwardedFor
        } else {
            ClientAddressSource::Peer
        };
        self
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

/// Count the request against the caller's window and reject once exhausted
///
/// With `skip_successful_requests`, responses below 400 hand their slot back.
pub async fn rate_limit<R>(
    State(limiter): State<RateLimiter<R>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    R: RateLimitStore + Send + Sync + 'static,
{
    let peer_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client = client_key(req.headers(), peer_ip, limiter.address_source);
    let key = format!("{}:{}", limiter.scope, client);

    let result = match limiter.store.check_and_increment(&key, &limiter.config).await {
        Ok(result) => result,
        Err(e) => {
            // Fail open
            tracing::error!(error = %e, "Rate limit store failed, allowing request");
            return next.run(req).await;
        }
    };

    if !result.allowed {
        tracing::warn!(key = %key, "Rate limit exceeded");
        let retry_after = result.retry_after_secs(now_ms());
        let mut response = LmsError::RateLimited(limiter.message).into_response();
        apply_headers(&mut response, &result);
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    let mut response = next.run(req).await;

    if limiter.config.skip_successful_requests && response.status().as_u16() < 400 {
        if let Err(e) = limiter.store.release(&key, result.window_start_ms).await {
            tracing::error!(error = %e, "Failed to release rate limit slot");
        }
    }

    apply_headers(&mut response, &result);
    response
}

fn apply_headers(response: &mut Response, result: &RateLimitResult) {
    let reset_secs = result.retry_after_secs(now_ms());
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(reset_secs));
}
