// HTTP error mapping
use crate::application::dashboard_service::SessionLimitReached;
use crate::domain::date_range::RangeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidRange(#[from] RangeError),

    #[error("session {0} not found")]
    SessionNotFound(u64),

    #[error(transparent)]
    TooManySessions(#[from] SessionLimitReached),

    #[error("failed to build response")]
    Response(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Response(status) => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
