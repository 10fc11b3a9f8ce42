use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::context::Interrupted;
use crate::application::error::ErrorReport;
use crate::application::songs::SongError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const INVALID_IDENTIFIER: &str = "invalid_identifier";
    pub const INVALID_ARGUMENT: &str = "invalid_argument";
    pub const CONSTRAINT: &str = "constraint_violation";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const CANCELED: &str = "canceled";
    pub const TIMEOUT: &str = "timeout";
    pub const CACHE: &str = "cache_error";
    pub const REPO: &str = "repo_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    /// Logged with the response, never sent to the client.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            detail: None,
        }
    }

    /// Internal failure whose text stays in the server log.
    pub fn internal(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        detail: String,
    ) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(status, code, message, None)
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<SongError> for ApiError {
    fn from(error: SongError) -> Self {
        match error {
            SongError::InvalidIdentifier { value } => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::INVALID_IDENTIFIER,
                "Invalid song identifier",
                Some(value),
            ),
            SongError::InvalidArgument { message } => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::INVALID_ARGUMENT,
                "Invalid argument",
                Some(message),
            ),
            SongError::Constraint { message } => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::CONSTRAINT,
                "Song violates a required constraint",
                Some(message),
            ),
            SongError::NotFound => ApiError::not_found("Song not found"),
            SongError::DuplicateId { constraint } => ApiError::new(
                StatusCode::CONFLICT,
                codes::DUPLICATE,
                "Song already exists",
                Some(constraint),
            ),
            SongError::Canceled(Interrupted::Canceled) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::CANCELED,
                "Request canceled",
                None,
            ),
            SongError::Canceled(Interrupted::DeadlineExceeded) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::TIMEOUT,
                "Request timed out",
                None,
            ),
            SongError::CacheRead(message) | SongError::CacheWrite(message) => ApiError::internal(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::CACHE,
                "Cache unavailable",
                message,
            ),
            SongError::CacheMiss { key } => ApiError::internal(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::CACHE,
                "Cache entry missing",
                key,
            ),
            SongError::Persistence(message) => ApiError::internal(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::REPO,
                "Persistence error",
                message,
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("Invalid request body", Some(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request("Invalid query string", Some(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let diagnostic = self.detail.or_else(|| self.hint.clone());
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!(
                "{}: {}",
                self.code,
                diagnostic.as_deref().unwrap_or(self.message)
            ),
        )
        .attach(&mut response);
        response
    }
}
