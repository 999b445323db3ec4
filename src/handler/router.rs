//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: request context, pre-dispatch
//! checks, route matching, error envelopes and response finalization.

use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use hyper::{Method, Request};
use tracing::Instrument;

use super::context::{CompletionGuard, RequestContext};
use super::endpoints;
use super::error::AppError;
use super::sleep;
use crate::config::AppState;
use crate::http::{self, HttpResponse, ResponseOptions};
use crate::logger;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible> {
    let ctx = RequestContext::from_request(&req);
    let span = tracing::info_span!("request", request_id = %ctx.request_id);

    let is_preflight = is_cors_preflight(&req);
    let options = ResponseOptions::from_request_headers(req.headers(), is_preflight);
    let size_check = check_body_size(&req, state.config.http.max_body_size);
    drop(req);

    Ok(process(ctx, &state, is_preflight, size_check, options)
        .instrument(span)
        .await)
}

async fn process(
    ctx: RequestContext,
    state: &AppState,
    is_preflight: bool,
    size_check: Result<(), AppError>,
    options: ResponseOptions,
) -> HttpResponse {
    let guard = CompletionGuard::start(&ctx);

    let outcome = if is_preflight {
        Ok(http::build_no_content_response())
    } else {
        match size_check {
            Ok(()) => dispatch_guarded(&ctx, state).await,
            Err(e) => Err(e),
        }
    };

    let response = outcome.unwrap_or_else(|err| {
        if err.status().is_server_error() {
            logger::log_error(&format!("Request {} failed: {err}", ctx.request_id));
        }
        err.into_response(&ctx, !state.config.app.is_production())
    });

    let response = http::finalize(response, &state.config.http, &ctx.request_id, options);
    guard.finish(response.status());
    response
}

/// Run the matched handler, turning a panic into an internal error
async fn dispatch_guarded(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, AppError> {
    AssertUnwindSafe(dispatch(ctx, state))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(AppError::Internal(panic_message(payload.as_ref()))))
}

/// Exact method + path match; anything else is not found
async fn dispatch(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, AppError> {
    match (&ctx.method, ctx.path.as_str()) {
        (&Method::GET, "/") => endpoints::handle_root(ctx, state),
        (&Method::GET, "/health") => endpoints::handle_health(ctx, state),
        (&Method::GET, "/sleep") => sleep::handle_sleep(ctx, state).await,
        (&Method::GET, "/api/info") => endpoints::handle_info(ctx, state),
        (&Method::GET, "/api/metrics") => endpoints::handle_metrics(ctx, state),
        _ => Err(AppError::NotFound {
            method: ctx.method.to_string(),
            url: ctx.url.clone(),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

fn is_cors_preflight<B>(req: &Request<B>) -> bool {
    req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(hyper::header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Whether the request declares an `application/json` body
fn has_json_body<B>(req: &Request<B>) -> bool {
    req.headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Validate Content-Length header against the configured limit.
///
/// Only JSON bodies are subject to the limit.
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Result<(), AppError> {
    if !has_json_body(req) {
        return Ok(());
    }

    let Some(content_length) = req.headers().get(hyper::header::CONTENT_LENGTH) else {
        return Ok(());
    };

    match content_length.to_str().ok().map(str::parse::<u64>) {
        Some(Ok(size)) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(AppError::PayloadTooLarge {
                size,
                limit: max_body_size,
            })
        }
        Some(Ok(_)) => Ok(()),
        _ => {
            logger::log_warning("Invalid Content-Length value, skipping size check");
            Ok(())
        }
    }
}
