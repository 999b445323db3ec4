//! Request failure taxonomy and its JSON rendering

use hyper::StatusCode;
use serde::Serialize;

use super::context::{Envelope, RequestContext};
use crate::http::{json_response_or_fallback, HttpResponse};

/// Public message for every 5xx, whatever the underlying cause
const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Sleep duration must be a positive number")]
    InvalidSleepDuration,

    #[error("Sleep duration cannot exceed {max}ms")]
    SleepDurationTooLong { max: u64 },

    #[error("Payload Too Large")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Endpoint not found")]
    NotFound { method: String, url: String },

    #[error("{0}")]
    Internal(String),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidSleepDuration | Self::SleepDurationTooLong { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Serialization(_))
    }

    /// Render the error envelope for `ctx`.
    ///
    /// Internal failures only carry `details` when `expose_details` is set.
    pub fn into_response(self, ctx: &RequestContext, expose_details: bool) -> HttpResponse {
        let body = if self.is_internal() {
            ErrorBody {
                error: INTERNAL_ERROR_MESSAGE.to_string(),
                method: None,
                url: None,
                details: expose_details.then(|| self.to_string()),
            }
        } else if let Self::NotFound { method, url } = &self {
            ErrorBody {
                error: self.to_string(),
                method: Some(method),
                url: Some(url),
                details: None,
            }
        } else {
            ErrorBody {
                error: self.to_string(),
                method: None,
                url: None,
                details: None,
            }
        };

        json_response_or_fallback(self.status(), &Envelope::new(ctx, body), &ctx.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{body_json, request_context};

    #[tokio::test]
    async fn test_not_found_echoes_method_and_url() {
        let ctx = request_context("POST", "/nope?x=1");
        let err = AppError::NotFound {
            method: "POST".to_string(),
            url: "/nope?x=1".to_string(),
        };
        let resp = err.into_response(&ctx, true);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = body_json(resp).await;
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["method"], "POST");
        assert_eq!(body["url"], "/nope?x=1");
        assert_eq!(body["requestId"], ctx.request_id.as_str());
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_details_follow_exposure_flag() {
        let ctx = request_context("GET", "/");

        let resp = AppError::Internal("probe exploded".to_string()).into_response(&ctx, true);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["details"], "probe exploded");

        let resp = AppError::Internal("probe exploded".to_string()).into_response(&ctx, false);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Internal Server Error");
        assert!(body.get("details").is_none());
        assert_eq!(body["requestId"], ctx.request_id.as_str());
    }

    #[tokio::test]
    async fn test_sleep_errors_are_bad_requests() {
        let ctx = request_context("GET", "/sleep");
        let resp = AppError::SleepDurationTooLong { max: 30_000 }.into_response(&ctx, true);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Sleep duration cannot exceed 30000ms");
        assert!(body.get("details").is_none());
    }
}
