use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::store::StoreError;

/// Request-level error taxonomy. Every variant is terminal for the
/// current invocation; retries are the client's job and are safe
/// because spins are idempotent per request token.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    InvalidArgument(String),
    FailedPrecondition {
        message: String,
        /// Present when a cooldown refused the spin, so the client
        /// can render a countdown instead of a generic failure.
        next_allowed_at: Option<OffsetDateTime>,
    },
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Sign-in required"),
            Self::InvalidArgument(message) => write!(f, "Invalid argument: {}", message),
            Self::FailedPrecondition { message, .. } => write!(f, "{}", message),
            Self::Internal(message) => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedConfig(_) => Self::FailedPrecondition {
                message: "Wheel configuration malformed".to_string(),
                next_allowed_at: None,
            },
            // Conflicts are handled at the insert call site; one leaking
            // this far means the fallback lookup itself failed.
            StoreError::Conflict => Self::Internal("unexpected storage conflict".to_string()),
            StoreError::Database(e) => Self::Internal(format!("database error: {}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Sign-in required" })),
            )
                .into_response(),
            Self::InvalidArgument(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::FailedPrecondition {
                message,
                next_allowed_at,
            } => {
                let mut body = json!({ "error": message });
                if let Some(at) = next_allowed_at.and_then(|at| at.format(&Rfc3339).ok()) {
                    body["nextAllowedAt"] = json!(at);
                }
                (StatusCode::PRECONDITION_FAILED, Json(body)).into_response()
            }
            Self::Internal(message) => {
                tracing::error!("internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
