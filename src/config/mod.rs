// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod size;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use size::parse_size;
pub use state::AppState;
pub use types::{
    AppConfig, Config, HttpConfig, LogFormat, LoggingConfig, ServerConfig, SleepConfig,
};

/// Flat environment variables recognized in addition to `DIXIT_*`
const ENV_OVERRIDES: [(&str, &str); 16] = [
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("WORKERS", "server.workers"),
    ("APP_NAME", "app.name"),
    ("APP_VERSION", "app.version"),
    ("APP_ENV", "app.environment"),
    ("CORS_ORIGIN", "http.cors_origin"),
    ("CORS_CREDENTIALS", "http.cors_credentials"),
    ("MAX_BODY_SIZE", "http.max_body_size"),
    ("SECURITY_HEADERS_ENABLED", "http.security_headers"),
    ("COMPRESSION_ENABLED", "http.compression"),
    ("SLEEP_DEFAULT_MS", "sleep.default_ms"),
    ("SLEEP_MAX_MS", "sleep.max_ms"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
    ("SHUTDOWN_TIMEOUT", "server.shutdown_timeout"),
];

impl Config {
    /// Load configuration from the process environment and an optional file.
    ///
    /// Default config file is "config.toml" when no path specified
    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        Self::load_with(config_path.unwrap_or("config"), |name| {
            std::env::var(name).ok()
        })
    }

    /// Load configuration using `lookup` for the flat environment overrides.
    pub fn load_with<F>(config_path: &str, lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_from(config_path, None, lookup)
    }

    /// `prefixed` replaces the process environment as the `DIXIT_*` source
    /// when given.
    ///
    /// Values from the environment stay strings until deserialization, so
    /// settings like `app.version = "2.0"` keep their exact text while typed
    /// fields are still converted.
    fn load_from<F>(
        config_path: &str,
        prefixed: Option<config::Map<String, String>>,
        lookup: F,
    ) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DIXIT")
                    .prefix_separator("_")
                    .separator("__")
                    .source(prefixed),
            );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, lookup(var))?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Builder pre-populated with every default value
    fn defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.header_read_timeout", 30)?
            .set_default("server.shutdown_timeout", 10)?
            .set_default("app.name", "Dixit App")?
            .set_default("app.version", "1.0.0")?
            .set_default("app.environment", "development")?
            .set_default("http.cors_origin", "*")?
            .set_default("http.cors_credentials", false)?
            .set_default("http.max_body_size", "10mb")?
            .set_default("http.security_headers", true)?
            .set_default("http.compression", true)?
            .set_default("sleep.default_ms", 1000)?
            .set_default("sleep.max_ms", 30_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.sleep.default_ms > self.sleep.max_ms {
            return Err(config::ConfigError::Message(format!(
                "sleep.default_ms ({}) exceeds sleep.max_ms ({})",
                self.sleep.default_ms, self.sleep.max_ms
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
