use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use rovia_coupon::CouponError;
use rovia_reservation::ReservationError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    CouponRejected(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::CouponRejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            ReservationError::Validation(_) => AppError::ValidationError(err.to_string()),
            ReservationError::InvalidTransition { .. } | ReservationError::OutOfOrder { .. } => {
                AppError::ConflictError(err.to_string())
            }
            ReservationError::Coupon(CouponError::Invalid) => {
                AppError::CouponRejected(err.to_string())
            }
            ReservationError::RedemptionConflict => AppError::ConflictError(err.to_string()),
            ReservationError::Coupon(CouponError::Ledger(_)) | ReservationError::Storage(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        AppError::from(ReservationError::from(err))
    }
}
