//! Error conversions - rendering [`AppError`] for HTTP clients

#[cfg(feature = "axum")]
use super::app_error::AppError;

/// Build the RFC 7807 Problem Details body for an error
///
/// `errors` is only present for validation failures that name a field.
#[cfg(feature = "axum")]
pub fn problem_details(err: &AppError) -> serde_json::Value {
    let mut body = serde_json::json!({
        "type": format!("https://httpstatuses.io/{}", err.status_code()),
        "title": err.kind().as_str(),
        "status": err.status_code(),
        "detail": err.message(),
        "action": err.action(),
    });

    if let Some(field) = err.field() {
        body["errors"] = serde_json::json!([{ "field": field, "message": err.message() }]);
    }

    body
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(problem_details(&self))).into_response()
    }
}
