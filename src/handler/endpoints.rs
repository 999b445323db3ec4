//! Informational endpoints: root, health, info and metrics

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use hyper::StatusCode;
use serde::Serialize;

use super::context::RequestContext;
use super::error::AppError;
use crate::config::AppState;
use crate::http::HttpResponse;
use crate::metrics::{format_megabytes, format_uptime, CpuTimes};

const WELCOME_MESSAGE: &str = "Hello World from EKS CI/CD Demo!!";

const DESCRIPTION: &str =
    "Demonstration service for exercising a CI/CD pipeline against a Kubernetes cluster";

const FEATURES: &[&str] = &[
    "Request ID tracking",
    "Structured request logging",
    "Health monitoring",
    "Performance metrics",
    "Bounded delay endpoint",
    "CORS support",
    "Security headers",
    "Response compression",
    "Graceful shutdown",
];

const ENDPOINTS: [(&str, &str); 5] = [
    ("/", "Welcome message with application details"),
    ("/health", "Health check with uptime and memory usage"),
    ("/sleep", "Delay the response by ?ms=<milliseconds> (default 1000)"),
    ("/api/info", "Application information and available endpoints"),
    ("/api/metrics", "Process uptime, memory, CPU and platform metrics"),
];

/// Runtime description reported under `platform.runtimeVersion`
const RUNTIME_VERSION: &str = concat!("rustc ", env!("CARGO_PKG_RUST_VERSION"), "+");

#[derive(Serialize)]
struct RootBody<'a> {
    message: &'static str,
    app: &'a str,
    version: &'a str,
    environment: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthMemory {
    rss: String,
    heap_used: String,
    heap_total: String,
    external: String,
}

#[derive(Serialize)]
struct HealthBody<'a> {
    status: &'static str,
    timestamp: String,
    uptime: String,
    memory: HealthMemory,
    environment: &'a str,
    app: &'a str,
    version: &'a str,
}

#[derive(Serialize)]
struct InfoBody<'a> {
    app: &'a str,
    version: &'a str,
    description: &'static str,
    features: &'static [&'static str],
    endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize)]
struct UptimeBody {
    seconds: u64,
    human: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsMemory {
    rss: u64,
    heap_used: u64,
    heap_total: u64,
    external: u64,
    array_buffers: u64,
}

#[derive(Serialize)]
struct CpuBody {
    user: u64,
    system: u64,
}

impl From<CpuTimes> for CpuBody {
    fn from(cpu: CpuTimes) -> Self {
        Self {
            user: cpu.user,
            system: cpu.system,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlatformBody {
    arch: &'static str,
    platform: &'static str,
    runtime_version: &'static str,
}

#[derive(Serialize)]
struct MetricsBody {
    timestamp: String,
    uptime: UptimeBody,
    memory: MetricsMemory,
    cpu: CpuBody,
    platform: PlatformBody,
}

/// Arrival time of the request, ISO 8601 with millisecond precision
fn iso_timestamp(ctx: &RequestContext) -> String {
    ctx.received_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /`
pub fn handle_root(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, AppError> {
    let app = &state.config.app;
    ctx.respond(
        StatusCode::OK,
        RootBody {
            message: WELCOME_MESSAGE,
            app: &app.name,
            version: &app.version,
            environment: &app.environment,
        },
    )
}

/// `GET /health`
///
/// Always reports healthy: reaching this handler proves the process is serving.
pub fn handle_health(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, AppError> {
    let app = &state.config.app;
    let memory = state.probe.snapshot().memory;

    ctx.respond(
        StatusCode::OK,
        HealthBody {
            status: "healthy",
            timestamp: iso_timestamp(ctx),
            uptime: format!("{} seconds", state.uptime().as_secs()),
            memory: HealthMemory {
                rss: format_megabytes(memory.rss),
                heap_used: format_megabytes(memory.heap_used),
                heap_total: format_megabytes(memory.heap_total),
                external: format_megabytes(memory.external),
            },
            environment: &app.environment,
            app: &app.name,
            version: &app.version,
        },
    )
}

/// `GET /api/info`
pub fn handle_info(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, AppError> {
    let app = &state.config.app;
    ctx.respond(
        StatusCode::OK,
        InfoBody {
            app: &app.name,
            version: &app.version,
            description: DESCRIPTION,
            features: FEATURES,
            endpoints: ENDPOINTS.into_iter().collect(),
        },
    )
}

/// `GET /api/metrics`
pub fn handle_metrics(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, AppError> {
    let snapshot = state.probe.snapshot();
    let seconds = state.uptime().as_secs();
    let memory = snapshot.memory;

    ctx.respond(
        StatusCode::OK,
        MetricsBody {
            timestamp: iso_timestamp(ctx),
            uptime: UptimeBody {
                seconds,
                human: format_uptime(seconds),
            },
            memory: MetricsMemory {
                rss: memory.rss,
                heap_used: memory.heap_used,
                heap_total: memory.heap_total,
                external: memory.external,
                array_buffers: memory.array_buffers,
            },
            cpu: snapshot.cpu.into(),
            platform: PlatformBody {
                arch: std::env::consts::ARCH,
                platform: std::env::consts::OS,
                runtime_version: RUNTIME_VERSION,
            },
        },
    )
}
