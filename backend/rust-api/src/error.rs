use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error taxonomy surfaced by every service. Handlers return this directly;
/// the `IntoResponse` impl keeps status mapping in one place.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing input the caller can correct.
    #[error("{0}")]
    Validation(String),

    /// A referenced quiz/chapter/lesson/recommendation does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation needs a known learner or admin identity.
    #[error("authentication required")]
    AuthRequired,

    /// External AI provider unreachable or returned garbage. Recoverable:
    /// generation falls back to the rule-based strategy before this ever
    /// reaches a caller.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Invalid state transition (e.g. publishing a non-approved lesson).
    /// Never retried silently.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected store or internal failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(what: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} {} not found", what, id))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AuthRequired => StatusCode::UNAUTHORIZED,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::AuthRequired => "auth_required",
            ApiError::ExternalService(_) => "external_service_error",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {:#}", self);
        }
        let body = Json(json!({
            "error": self.kind(),
            "detail": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("quiz", "q1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::AuthRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::ExternalService("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Conflict("not approved".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn not_found_names_the_resource() {
        let err = ApiError::not_found("lesson", "abc");
        assert_eq!(err.to_string(), "lesson abc not found");
    }
}
