//! API response types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use yatube_common::{AppError, FieldErrors};

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Re-render a submitted form alongside its validation errors.
    pub fn invalid(data: T, errors: &FieldErrors) -> Self {
        let err = AppError::Validation(errors.clone());
        Self {
            data: Some(data),
            error: Some(ApiError {
                code: err.error_code().to_string(),
                message: err.to_string(),
            }),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.error.is_some() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        (status, Json(self)).into_response()
    }
}

/// `302 Found` pointing at `location`.
#[must_use]
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => AppError::Internal(format!("invalid redirect target: {e}")).into_response(),
    }
}

/// Redirect to the login page, remembering where the visitor was headed.
///
/// Slashes in `next` stay readable; every other reserved character is
/// percent-encoded.
#[must_use]
pub fn login_redirect(login_url: &str, next: &str) -> Response {
    let next = urlencoding::encode(next).replace("%2F", "/");
    found(&format!("{login_url}?next={next}"))
}
