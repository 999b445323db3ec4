// Application state module
// Read-only state shared by every request

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::types::Config;
use crate::metrics::{ProcessProbe, SystemProbe};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Process start, used for uptime reporting
    pub started_at: Instant,
    /// Source of memory and CPU readings
    pub probe: Arc<dyn ProcessProbe>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_probe(config, Arc::new(SystemProbe::new()))
    }

    pub fn with_probe(config: Config, probe: Arc<dyn ProcessProbe>) -> Self {
        Self {
            config,
            started_at: Instant::now(),
            probe,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
