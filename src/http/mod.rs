//! HTTP protocol layer module
//!
//! JSON response builders and the response middleware, decoupled from the
//! endpoint handlers.

pub mod middleware;
pub mod response;

// Re-export commonly used types
pub use middleware::{finalize, ResponseOptions};
pub use response::{
    build_no_content_response, json_response, json_response_or_fallback, HttpResponse,
};
