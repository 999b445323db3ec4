//! Dixit App: a small JSON service used to exercise a CI/CD pipeline.
//!
//! Every response carries a per-request `requestId`; `/sleep` holds a response
//! for a bounded, caller-chosen delay without blocking other requests.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod server;
