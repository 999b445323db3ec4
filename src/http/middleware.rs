//! Response post-processing: request ID, CORS, security headers, compression

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, VARY};

use super::response::HttpResponse;
use crate::config::HttpConfig;
use crate::logger;

/// Bodies smaller than this are sent uncompressed
pub const COMPRESSION_THRESHOLD: usize = 1024;

const SECURITY_HEADERS: [(&str, &str); 9] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("x-dns-prefetch-control", "off"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("x-xss-protection", "0"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'self'",
    ),
];

const PREFLIGHT_METHODS: &str = "GET, HEAD, OPTIONS";
const PREFLIGHT_HEADERS: &str = "Content-Type, Authorization, X-Request-Id";

/// Request facts the response layer needs after the request has been consumed
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseOptions {
    pub accepts_gzip: bool,
    pub is_preflight: bool,
}

impl ResponseOptions {
    pub fn from_request_headers(headers: &HeaderMap, is_preflight: bool) -> Self {
        let accepts_gzip = headers
            .get_all(hyper::header::ACCEPT_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|coding| {
                let mut parts = coding.trim().split(';');
                let name = parts.next().unwrap_or("").trim();
                let rejected = parts.any(|p| matches!(p.trim(), "q=0" | "q=0.0" | "q=0.00" | "q=0.000"));
                (name.eq_ignore_ascii_case("gzip") || name == "*") && !rejected
            });

        Self {
            accepts_gzip,
            is_preflight,
        }
    }
}

/// Apply every response layer in order
pub fn finalize(
    mut resp: HttpResponse,
    config: &HttpConfig,
    request_id: &str,
    options: ResponseOptions,
) -> HttpResponse {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        resp.headers_mut().insert("x-request-id", value);
    }

    apply_cors(resp.headers_mut(), config, options.is_preflight);

    if config.security_headers {
        apply_security_headers(resp.headers_mut());
    }

    if config.compression && options.accepts_gzip {
        resp = compress(resp);
    }

    resp
}

fn apply_cors(headers: &mut HeaderMap, config: &HttpConfig, is_preflight: bool) {
    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => {
            headers.insert("access-control-allow-origin", origin);
        }
        Err(e) => {
            logger::log_warning(&format!(
                "Invalid CORS origin '{}': {e}",
                config.cors_origin
            ));
            return;
        }
    }

    if config.cors_origin != "*" {
        append_vary(headers, "Origin");
    }
    if config.cors_credentials {
        headers.insert(
            "access-control-allow-credentials",
            HeaderValue::from_static("true"),
        );
    }
    if is_preflight {
        headers.insert(
            "access-control-allow-methods",
            HeaderValue::from_static(PREFLIGHT_METHODS),
        );
        headers.insert(
            "access-control-allow-headers",
            HeaderValue::from_static(PREFLIGHT_HEADERS),
        );
    }
}

fn apply_security_headers(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Gzip the body in place when it is large enough to benefit
fn compress(resp: HttpResponse) -> HttpResponse {
    let (mut parts, body) = resp.into_parts();
    let Some(data) = full_body_bytes(body) else {
        return HttpResponse::from_parts(parts, Full::new(Bytes::new()));
    };

    if data.len() < COMPRESSION_THRESHOLD || parts.headers.contains_key(CONTENT_ENCODING) {
        return HttpResponse::from_parts(parts, Full::new(data));
    }

    match gzip(&data) {
        Ok(compressed) => {
            parts
                .headers
                .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            parts
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from(compressed.len()));
            append_vary(&mut parts.headers, "Accept-Encoding");
            HttpResponse::from_parts(parts, Full::new(Bytes::from(compressed)))
        }
        Err(e) => {
            logger::log_warning(&format!("Compression failed, sending identity body: {e}"));
            HttpResponse::from_parts(parts, Full::new(data))
        }
    }
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Pull the single buffered chunk out of a `Full` body
fn full_body_bytes(body: Full<Bytes>) -> Option<Bytes> {
    use futures::FutureExt;
    use http_body_util::BodyExt;

    // `Full` yields its only frame immediately, so polling once is enough.
    body.collect()
        .now_or_never()?
        .ok()
        .map(http_body_util::Collected::to_bytes)
}

fn append_vary(headers: &mut HeaderMap, value: &'static str) {
    let already = headers
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|v| v.trim().eq_ignore_ascii_case(value));
    if !already {
        headers.append(VARY, HeaderValue::from_static(value));
    }
}
