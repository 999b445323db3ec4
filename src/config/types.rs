// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub http: HttpConfig,
    pub sleep: SleepConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Seconds a connection may take to send request headers
    pub header_read_timeout: u64,
    /// Seconds in-flight connections get to finish after a shutdown signal
    pub shutdown_timeout: u64,
}

/// Application identity reported by the informational endpoints
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub environment: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// HTTP middleware configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub cors_origin: String,
    pub cors_credentials: bool,
    /// Maximum accepted request body in bytes, parsed from strings like "10mb"
    #[serde(deserialize_with = "super::size::deserialize_size")]
    pub max_body_size: u64,
    pub security_headers: bool,
    pub compression: bool,
}

/// Delay endpoint bounds, in milliseconds
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SleepConfig {
    pub default_ms: u64,
    pub max_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}
