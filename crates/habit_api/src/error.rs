//! JSON error envelope.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use habit_core::{CalendarError, ServiceError};
use log::{error, warn};
use serde_json::json;

/// Error returned by handlers, rendered as `{"detail": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let status = match &value {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::ItemNotFound(_) => StatusCode::BAD_REQUEST,
            ServiceError::AchievementNotFound(_) | ServiceError::NoRecordForDate(_) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Quote(_) => StatusCode::BAD_GATEWAY,
            ServiceError::StorageUnavailable | ServiceError::Repo(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, value.to_string())
    }
}

impl From<CalendarError> for ApiError {
    fn from(value: CalendarError) -> Self {
        Self::unprocessable(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::unprocessable(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::unprocessable(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::unprocessable(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "event=http_error module=api status=error code={} detail={}",
                self.status.as_u16(),
                self.detail
            );
        } else {
            warn!(
                "event=http_error module=api status=rejected code={} detail={}",
                self.status.as_u16(),
                self.detail
            );
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
