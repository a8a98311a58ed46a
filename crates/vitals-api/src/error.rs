//! Error → HTTP response mapping.
//!
//! | Error                                              | Status |
//! |----------------------------------------------------|--------|
//! | `NotFound`                                         | 404    |
//! | `DuplicateId`, `InvalidQuery`                      | 400    |
//! | `ValidationError`, failed schema check             | 422    |
//! | `Conflict`                                         | 409    |
//! | `StorageUnavailable`, `ConfigError`, `ModelError`  | 500    |
//!
//! Bodies are `{"detail": "<message>"}`, except validation failures which
//! carry `{"detail": [{"field", "reason"}, ...]}`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use vitals_contracts::{
    error::VitalsError,
    verify::{FieldViolation, ValidationReport},
};

/// Everything a handler can fail with.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// A core operation failed.
    Core(VitalsError),
    /// The request body failed schema validation.
    Rejected(Vec<FieldViolation>),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Status code for a core error.
pub fn status_of(error: &VitalsError) -> StatusCode {
    match error {
        VitalsError::NotFound { .. } => StatusCode::NOT_FOUND,
        VitalsError::DuplicateId { .. } | VitalsError::InvalidQuery { .. } => {
            StatusCode::BAD_REQUEST
        }
        VitalsError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        VitalsError::Conflict { .. } => StatusCode::CONFLICT,
        VitalsError::StorageUnavailable { .. }
        | VitalsError::ConfigError { .. }
        | VitalsError::ModelError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<VitalsError> for ApiError {
    fn from(error: VitalsError) -> Self {
        ApiError::Core(error)
    }
}

impl From<ValidationReport> for ApiError {
    fn from(report: ValidationReport) -> Self {
        ApiError::Rejected(report.violations)
    }
}

/// Missing body, wrong content type, or JSON that does not parse.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Core(VitalsError::invalid("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Core(VitalsError::InvalidQuery {
            reason: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let violations = match self {
            ApiError::Rejected(violations) => violations,
            ApiError::Core(VitalsError::ValidationError { field, reason }) => {
                vec![FieldViolation { field, reason }]
            }
            ApiError::Core(other) => {
                let status = status_of(&other);
                warn!(status = status.as_u16(), error = %other, "request failed");
                return (status, Json(json!({ "detail": other.to_string() }))).into_response();
            }
        };
        warn!(
            fields = ?violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>(),
            "request rejected"
        );
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": violations })),
        )
            .into_response()
    }
}

/// Router fallback for paths no route matches.
pub(crate) async fn no_route(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": format!("no route for '{}'", uri.path()) })),
    )
}
