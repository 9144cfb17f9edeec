use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::submission::SubmissionError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    code: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    retryable: bool,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Submission(SubmissionError),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        Self::Submission(err)
    }
}

fn submission_status(err: &SubmissionError) -> StatusCode {
    match err {
        SubmissionError::Validation(_) | SubmissionError::InvalidAnswerSet(_) => {
            StatusCode::BAD_REQUEST
        }
        SubmissionError::DuplicateSubmission => StatusCode::CONFLICT,
        SubmissionError::ExamNotActive(_) => StatusCode::FORBIDDEN,
        SubmissionError::DegenerateExam
        | SubmissionError::InvalidExam(_)
        | SubmissionError::MalformedExam(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionError::ExamNotFound | SubmissionError::UserNotFound => StatusCode::NOT_FOUND,
        SubmissionError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_body(status: StatusCode, code: &'static str, detail: String, retryable: bool) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), code, detail, retryable }))
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response = error_body(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    message.to_string(),
                    false,
                );
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                error_body(StatusCode::FORBIDDEN, "forbidden", message.to_string(), false)
            }
            ApiError::BadRequest(message) => {
                error_body(StatusCode::BAD_REQUEST, "validation_error", message, false)
            }
            ApiError::NotFound(message) => {
                error_body(StatusCode::NOT_FOUND, "not_found", message, false)
            }
            ApiError::Submission(err) => {
                // Storage details stay in the logs.
                let detail = match &err {
                    SubmissionError::Storage(_) => {
                        "Storage is temporarily unavailable, please retry".to_string()
                    }
                    other => other.to_string(),
                };
                error_body(submission_status(&err), err.code(), detail, err.is_retryable())
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message, false)
            }
        }
    }
}
