//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Subscriber setup (text or JSON lines)
//! - Server lifecycle logging
//! - Per-request start/completion records
//! - Error and warning logging

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogFormat, LoggingConfig};

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Should be called
/// once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(false))
            .try_init()?,
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).try_init()?,
    }

    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        app = %config.app.name,
        version = %config.app.version,
        environment = %config.app.environment,
        "{} listening at http://{addr}",
        config.app.name
    );
    tracing::info!(
        workers = ?config.server.workers,
        max_body_size = config.http.max_body_size,
        cors_origin = %config.http.cors_origin,
        security_headers = config.http.security_headers,
        compression = config.http.compression,
        sleep_max_ms = config.sleep.max_ms,
        "Loaded configuration"
    );
}

pub fn log_request_start(request_id: &str, method: &str, url: &str) {
    tracing::info!(request_id, method, url, "START");
}

pub fn log_request_complete(
    request_id: &str,
    method: &str,
    url: &str,
    status: u16,
    elapsed: Duration,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(request_id, method, url, status, duration_ms, "{status} - {duration_ms}ms");
}

pub fn log_request_cancelled(request_id: &str, method: &str, url: &str, elapsed: Duration) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(request_id, method, url, duration_ms, "cancelled after {duration_ms}ms");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::debug!(error = ?err, "Failed to serve connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_shutdown_started(grace: Duration) {
    tracing::info!(
        grace_secs = grace.as_secs(),
        "Shutdown signal received, no longer accepting connections"
    );
}

pub fn log_shutdown_complete(drained: bool) {
    if drained {
        tracing::info!("All connections drained, exiting");
    } else {
        tracing::warn!("Shutdown grace period elapsed with connections still open");
    }
}
