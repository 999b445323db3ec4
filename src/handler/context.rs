//! Per-request context, response envelope and completion logging

use std::time::Instant;

use chrono::{DateTime, Utc};
use hyper::{Method, Request, StatusCode};
use serde::Serialize;
use uuid::Uuid;

use super::error::AppError;
use crate::http::{json_response, HttpResponse};
use crate::logger;

/// Read-only facts about one request, created on arrival
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation ID returned in every response
    pub request_id: String,
    pub received_at: DateTime<Utc>,
    pub started: Instant,
    pub method: Method,
    pub path: String,
    /// Path plus query string, as sent by the client
    pub url: String,
    query: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let uri = req.uri();
        Self {
            request_id: generate_request_id(),
            received_at: Utc::now(),
            started: Instant::now(),
            method: req.method().clone(),
            path: uri.path().to_string(),
            url: uri
                .path_and_query()
                .map_or_else(|| uri.path().to_string(), ToString::to_string),
            query: uri.query().map(ToString::to_string),
        }
    }

    /// First value of query parameter `name`, percent-decoded
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Wrap `body` in the envelope and serialize it
    pub fn respond<T: Serialize>(&self, status: StatusCode, body: T) -> Result<HttpResponse, AppError> {
        json_response(status, &Envelope::new(self, body)).map_err(AppError::from)
    }
}

fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Uniform response shape: endpoint fields followed by `requestId`
#[derive(Serialize)]
pub struct Envelope<'a, T> {
    #[serde(flatten)]
    pub body: T,
    #[serde(rename = "requestId")]
    pub request_id: &'a str,
}

impl<'a, T> Envelope<'a, T> {
    pub fn new(ctx: &'a RequestContext, body: T) -> Self {
        Self {
            body,
            request_id: &ctx.request_id,
        }
    }
}

/// Emits the start record on creation and the completion record on drop.
///
/// A guard dropped without [`CompletionGuard::finish`] means the request
/// future was abandoned (client went away) and is logged as cancelled.
pub struct CompletionGuard<'a> {
    ctx: &'a RequestContext,
    status: Option<StatusCode>,
}

impl<'a> CompletionGuard<'a> {
    pub fn start(ctx: &'a RequestContext) -> Self {
        logger::log_request_start(&ctx.request_id, ctx.method.as_str(), &ctx.url);
        Self { ctx, status: None }
    }

    pub fn finish(mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        let ctx = self.ctx;
        let elapsed = ctx.started.elapsed();
        match self.status {
            Some(status) => logger::log_request_complete(
                &ctx.request_id,
                ctx.method.as_str(),
                &ctx.url,
                status.as_u16(),
                elapsed,
            ),
            None => logger::log_request_cancelled(
                &ctx.request_id,
                ctx.method.as_str(),
                &ctx.url,
                elapsed,
            ),
        }
    }
}
