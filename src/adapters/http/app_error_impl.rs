use crate::app_error::{AppError, ErrorCode, TrustError};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full detail goes to the log only; trust failures share one response so
        // the client cannot tell a bad key from a bad payload.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Token(_) => {
                error_resp(StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials, None)
            }
            AppError::Trust(TrustError::NoActiveSession) => error_resp(
                StatusCode::UNAUTHORIZED,
                ErrorCode::NoActiveSession,
                Some("log in again to refresh the session".into()),
            ),
            AppError::Trust(_) => error_resp(
                StatusCode::UNAUTHORIZED,
                ErrorCode::PayloadRejected,
                Some("payload rejected".into()),
            ),
            AppError::Forbidden => error_resp(StatusCode::FORBIDDEN, ErrorCode::Forbidden, None),
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::NotFound => error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None),
            AppError::Database(_) | AppError::TransactionFailed(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                None,
            ),
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                None,
            ),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
