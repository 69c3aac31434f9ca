//! Error types for zen-dl
//!
//! Every failure ends the request. Callers only ever see the fixed,
//! deliberately vague messages below; details go to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const MSG_TIMEOUT: &str =
    "Download timed out. The video might be too long or temporarily unavailable.";
pub const MSG_ARTIFACT_MISSING: &str = "File was not created successfully";
pub const MSG_UNEXPECTED: &str = "Unexpected server error. Please try again later.";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Empty or unsupported URL, bad filename (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Extractor exited non-zero; message already classified (400)
    #[error("Extractor failed: {0}")]
    ToolReported(String),

    /// Extractor exceeded its wall-clock limit (408)
    #[error("Extractor timed out")]
    ToolTimeout,

    /// Extractor reported success but no artifact was found (500)
    #[error("Artifact missing for job {0}")]
    ArtifactMissing(String),

    /// Requested artifact does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else (500)
    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::ToolReported(_) => StatusCode::BAD_REQUEST,
            ApiError::ToolTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ArtifactMissing(_) | ApiError::Unclassified(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::ToolReported(_) => "EXTRACTION_FAILED",
            ApiError::ToolTimeout => "EXTRACTION_TIMEOUT",
            ApiError::ArtifactMissing(_) => "ARTIFACT_MISSING",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unclassified(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller
    pub fn detail(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::ToolReported(msg) => msg.clone(),
            ApiError::ToolTimeout => MSG_TIMEOUT.to_string(),
            ApiError::ArtifactMissing(_) => MSG_ARTIFACT_MISSING.to_string(),
            ApiError::NotFound(_) => "File not found".to_string(),
            ApiError::Unclassified(_) => MSG_UNEXPECTED.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Unclassified(ref err) = self {
            tracing::error!("Unclassified error: {:#}", err);
        }

        let body = Json(json!({
            "detail": self.detail(),
            "code": self.code(),
        }));

        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (status, body) = render(ApiError::Validation("URL is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "URL is required");
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = render(ApiError::ToolReported("x".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = render(ApiError::ToolTimeout).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["detail"], MSG_TIMEOUT);

        let (status, body) = render(ApiError::ArtifactMissing("abcd1234".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], MSG_ARTIFACT_MISSING);
    }

    #[tokio::test]
    async fn test_unclassified_hides_details() {
        let err = ApiError::from(anyhow::anyhow!("/srv/secret/path: permission denied"));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], MSG_UNEXPECTED);
        assert!(!body.to_string().contains("secret"));
    }
}
