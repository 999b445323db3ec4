//! Request handler module
//!
//! Responsible for the request lifecycle, route dispatch and the endpoint
//! handlers themselves.

pub mod context;
pub mod endpoints;
pub mod error;
pub mod router;
pub mod sleep;

// Re-export main entry point
pub use context::RequestContext;
pub use error::AppError;
pub use router::handle_request;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use http_body_util::BodyExt;
    use hyper::Request;

    use super::RequestContext;
    use crate::config::{AppState, Config};
    use crate::http::HttpResponse;
    use crate::metrics::{CpuTimes, MemoryUsage, ProcessProbe, ProcessSnapshot};

    pub const FIXED_SNAPSHOT: ProcessSnapshot = ProcessSnapshot {
        memory: MemoryUsage {
            rss: 64 * 1024 * 1024,
            heap_used: 32 * 1024 * 1024,
            heap_total: 48 * 1024 * 1024,
            external: 2 * 1024 * 1024,
            array_buffers: 4096,
        },
        cpu: CpuTimes {
            user: 120_000,
            system: 30_000,
        },
    };

    pub struct FixedProbe;

    impl ProcessProbe for FixedProbe {
        fn snapshot(&self) -> ProcessSnapshot {
            FIXED_SNAPSHOT
        }
    }

    pub struct PanickingProbe;

    impl ProcessProbe for PanickingProbe {
        fn snapshot(&self) -> ProcessSnapshot {
            panic!("probe unavailable")
        }
    }

    pub fn test_config(environment: &str) -> Config {
        let environment = environment.to_string();
        Config::load_with("does-not-exist", move |name| {
            (name == "APP_ENV").then(|| environment.clone())
        })
        .expect("default config loads")
    }

    pub fn test_state() -> AppState {
        test_state_with("development", Arc::new(FixedProbe))
    }

    pub fn test_state_with(environment: &str, probe: Arc<dyn ProcessProbe>) -> AppState {
        AppState::with_probe(test_config(environment), probe)
    }

    pub fn request_context(method: &str, uri: &str) -> RequestContext {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        RequestContext::from_request(&req)
    }

    pub async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).expect("response body is JSON")
    }
}
