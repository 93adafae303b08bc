use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use quad_types::api::ErrorBody;
use quad_types::error::UnlockError;

/// Maps the unlock error taxonomy onto HTTP. Storage faults are logged here
/// and returned as an opaque 500; everything else carries its own message.
pub struct ApiError(pub UnlockError);

impl From<UnlockError> for ApiError {
    fn from(e: UnlockError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            UnlockError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.0.to_string()),
            UnlockError::AlreadyUnlocked => {
                (StatusCode::CONFLICT, "already_unlocked", self.0.to_string())
            }
            UnlockError::SelfDealingForbidden => (
                StatusCode::FORBIDDEN,
                "self_dealing_forbidden",
                self.0.to_string(),
            ),
            UnlockError::PaymentServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "payment_service_unavailable",
                self.0.to_string(),
            ),
            UnlockError::InvalidSignature => (
                StatusCode::BAD_REQUEST,
                "invalid_signature",
                self.0.to_string(),
            ),
            UnlockError::PaymentNotCaptured => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_not_captured",
                self.0.to_string(),
            ),
            UnlockError::Internal(e) => {
                error!("internal error serving unlock request: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}
