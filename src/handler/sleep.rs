//! Delay endpoint: holds the response for a bounded, client-chosen duration

use std::time::Duration;

use hyper::StatusCode;
use serde::Serialize;

use super::context::RequestContext;
use super::error::AppError;
use crate::config::{AppState, SleepConfig};
use crate::http::HttpResponse;

#[derive(Serialize)]
struct SleepBody {
    message: String,
    duration: u64,
}

/// `GET /sleep?ms=<n>`
///
/// Validation happens before any waiting, so rejected requests return at once.
/// The echoed `duration` is the requested value, not a measurement.
pub async fn handle_sleep(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, AppError> {
    let ms = resolve_duration(ctx.query_param("ms").as_deref(), state.config.sleep)?;

    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    ctx.respond(
        StatusCode::OK,
        SleepBody {
            message: format!("Slept {ms}ms"),
            duration: ms,
        },
    )
}

/// Turn the raw `ms` parameter into a delay within `limits`
pub fn resolve_duration(raw: Option<&str>, limits: SleepConfig) -> Result<u64, AppError> {
    let Some(raw) = raw else {
        return Ok(limits.default_ms);
    };

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidSleepDuration);
    }

    // All digits: the only parse failure left is overflow, which is over any limit.
    let ms = raw.parse::<u64>().unwrap_or(u64::MAX);
    if ms > limits.max_ms {
        return Err(AppError::SleepDurationTooLong {
            max: limits.max_ms,
        });
    }

    Ok(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{body_json, request_context, test_state};
    use tokio::time::Instant;

    const LIMITS: SleepConfig = SleepConfig {
        default_ms: 1000,
        max_ms: 30_000,
    };

    #[test]
    fn test_resolve_default_and_bounds() {
        assert_eq!(resolve_duration(None, LIMITS).unwrap(), 1000);
        assert_eq!(resolve_duration(Some("0"), LIMITS).unwrap(), 0);
        assert_eq!(resolve_duration(Some("500"), LIMITS).unwrap(), 500);
        assert_eq!(resolve_duration(Some("30000"), LIMITS).unwrap(), 30_000);
    }

    #[test]
    fn test_resolve_rejects_non_integers() {
        for raw in ["", "-5", "abc", "1.5", "12abc", " 10", "+10"] {
            assert!(
                matches!(
                    resolve_duration(Some(raw), LIMITS),
                    Err(AppError::InvalidSleepDuration)
                ),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_too_long() {
        for raw in ["30001", "50000", "99999999999999999999999"] {
            assert!(matches!(
                resolve_duration(Some(raw), LIMITS),
                Err(AppError::SleepDurationTooLong { max: 30_000 })
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_sleep_waits_one_second() {
        let state = test_state();
        let ctx = request_context("GET", "/sleep");
        let start = Instant::now();

        let resp = handle_sleep(&ctx, &state).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "Slept 1000ms");
        assert_eq!(body["duration"], 1000);
        assert_eq!(body["requestId"], ctx.request_id.as_str());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_sleep_waits_requested_time() {
        let state = test_state();
        let ctx = request_context("GET", "/sleep?ms=500");
        let start = Instant::now();

        let resp = handle_sleep(&ctx, &state).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(1000));
        let body = body_json(resp).await;
        assert_eq!(body["message"], "Slept 500ms");
        assert_eq!(body["duration"], 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_returns_without_waiting() {
        let state = test_state();
        let ctx = request_context("GET", "/sleep?ms=0");
        let start = Instant::now();

        let resp = handle_sleep(&ctx, &state).await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        let body = body_json(resp).await;
        assert_eq!(body["duration"], 0);
        assert_eq!(body["message"], "Slept 0ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_requests_do_not_wait() {
        let state = test_state();
        for uri in ["/sleep?ms=50000", "/sleep?ms=-5", "/sleep?ms=abc"] {
            let ctx = request_context("GET", uri);
            let start = Instant::now();
            let result = handle_sleep(&ctx, &state).await;
            assert!(result.is_err());
            assert_eq!(start.elapsed(), Duration::ZERO);
        }
    }
}
