//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::booking::BookingError;
use crate::db::DatabaseError;
use crate::payments::PaymentError;
use crate::reviews::ReviewError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Token expired")]
    TokenExpired,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token expired, log in again".to_string(),
            ),
            ApiError::Forbidden(detail) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            DatabaseError::ConstraintViolation(detail) => ApiError::Conflict(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized
            }
            AuthError::EmailTaken => ApiError::Conflict("Email already registered".into()),
            AuthError::Hash(detail) => ApiError::Internal(detail),
            AuthError::Database(e) => e.into(),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::AppointmentNotFound
            | BookingError::DoctorNotFound
            | BookingError::ServiceNotFound => ApiError::NotFound(err.to_string()),
            BookingError::DoctorUnavailable => ApiError::Conflict(err.to_string()),
            BookingError::SlotTaken { .. } => ApiError::Conflict(err.to_string()),
            BookingError::InvalidTransition { .. } => ApiError::BadRequest(err.to_string()),
            BookingError::Database(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::PaymentNotFound | PaymentError::MethodNotFound => {
                ApiError::NotFound(err.to_string())
            }
            PaymentError::AlreadyCompleted => ApiError::Conflict(err.to_string()),
            PaymentError::Database(e) => e.into(),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::AppointmentNotFound => ApiError::NotFound(err.to_string()),
            ReviewError::AlreadyReviewed => ApiError::Conflict(err.to_string()),
            ReviewError::NotCompleted | ReviewError::InvalidRating => {
                ApiError::BadRequest(err.to_string())
            }
            ReviewError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn conflict_returns_409() {
        let response = ApiError::Conflict("slot already booked".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert_eq!(json["error"]["message"], "slot already booked");
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let response = ApiError::Forbidden("Doctor role required".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Appointment not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_returns_500_and_hides_detail() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        // Internal errors hide details from client
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn serialization_failure_maps_to_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ApiError = DatabaseError::Serialization(json_err).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn booking_slot_taken_maps_to_conflict() {
        let err: ApiError = crate::booking::BookingError::SlotTaken {
            date: chrono::NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            slot: "10:00".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn constraint_violation_maps_to_conflict() {
        let err: ApiError = DatabaseError::ConstraintViolation("UNIQUE failed".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
