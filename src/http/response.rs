//! HTTP response building module
//!
//! Every body this service produces is JSON; these builders are the only place
//! responses are assembled.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

pub type HttpResponse = Response<Full<Bytes>>;

const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Serialize `body` and build a JSON response with the given status
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<HttpResponse, serde_json::Error> {
    let json = serde_json::to_vec(body)?;
    Ok(build_json(status, Bytes::from(json)))
}

/// Like [`json_response`], but never fails: serialization errors degrade to a
/// minimal 500 envelope that still carries `request_id`.
pub fn json_response_or_fallback<T: Serialize>(
    status: StatusCode,
    body: &T,
    request_id: &str,
) -> HttpResponse {
    json_response(status, body).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to serialize response: {e}"));
        let fallback = serde_json::json!({
            "error": INTERNAL_ERROR_MESSAGE,
            "requestId": request_id,
        });
        build_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::from(fallback.to_string()),
        )
    })
}

/// Build 204 No Content response (CORS preflight)
pub fn build_no_content_response() -> HttpResponse {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = StatusCode::NO_CONTENT;
    resp
}

fn build_json(status: StatusCode, body: Bytes) -> HttpResponse {
    let content_length = HeaderValue::from(body.len());
    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = status;

    let headers = resp.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers.insert(CONTENT_LENGTH, content_length);
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_json_response_sets_headers() {
        let resp = json_response(StatusCode::CREATED, &serde_json::json!({"ok": true})).unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers()["content-type"],
            "application/json; charset=utf-8"
        );
        assert_eq!(resp.headers()["content-length"], "11");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }

    #[test]
    fn test_no_content_has_empty_body() {
        let resp = build_no_content_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().get("content-type").is_none());
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[tokio::test]
    async fn test_fallback_keeps_request_id() {
        let resp = json_response_or_fallback(StatusCode::OK, &Unserializable, "req-123");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers()["content-type"],
            "application/json; charset=utf-8"
        );

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["requestId"], "req-123");
    }
}
