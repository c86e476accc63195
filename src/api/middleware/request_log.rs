//! Access log middleware with sensitive-field masking.
//!
//! Emits one structured log entry per request: method, path, query,
//! status, latency, request headers and JSON body. Fields named
//! `password`, `password_hash`, or `x-api-key` (case-insensitive, at any
//! nesting depth) are replaced with a fixed marker before logging.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

/// Replacement marker for sensitive values
const MASK: &str = "***MASKED***";

/// Field names that must never be logged verbatim
const SENSITIVE_FIELDS: &[&str] = &["password", "password_hash", "x-api-key"];

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_FIELDS.contains(&key.to_ascii_lowercase().as_str())
}

/// Access logging middleware.
pub async fn request_log_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let query = request.uri().query().unwrap_or("").to_owned();
    let request_headers = mask_headers(request.headers());

    // Buffer JSON request bodies so they can be logged after masking.
    let (request, request_body) = if is_json(request.headers()) {
        buffer_request(request).await
    } else {
        (request, None)
    };

    let response = next.run(request).await;
    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    // Only error responses get their body recorded.
    let (response, response_body) = if status.as_u16() >= 400 {
        buffer_response(response).await
    } else {
        (response, None)
    };

    let request_body = request_body
        .map(|bytes| mask_json(&bytes))
        .unwrap_or(Value::Null);
    let response_body = response_body.unwrap_or_default();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            query = %query,
            status = status.as_u16(),
            latency_ms,
            request_headers = %request_headers,
            request_body = %request_body,
            response_body = %response_body,
            "request failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            query = %query,
            status = status.as_u16(),
            latency_ms,
            request_headers = %request_headers,
            request_body = %request_body,
            response_body = %response_body,
            "request error"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            query = %query,
            status = status.as_u16(),
            latency_ms,
            request_headers = %request_headers,
            request_body = %request_body,
            "request completed"
        );
    }

    response
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Read the request body into memory and hand back a replayable request.
async fn buffer_request(request: Request) -> (Request, Option<Bytes>) {
    let (parts, body) = request.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let request = Request::from_parts(parts, Body::from(bytes.clone()));
            (request, Some(bytes))
        }
        Err(_) => (Request::from_parts(parts, Body::empty()), None),
    }
}

/// Read the response body into memory and hand back a replayable response.
async fn buffer_response(response: Response) -> (Response, Option<String>) {
    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            (Response::from_parts(parts, Body::from(bytes)), Some(text))
        }
        Err(_) => (Response::from_parts(parts, Body::empty()), None),
    }
}

/// Render headers as a JSON object with sensitive values masked.
fn mask_headers(headers: &HeaderMap) -> Value {
    let mut map = serde_json::Map::new();
    for (name, value) in headers {
        let rendered = if is_sensitive(name.as_str()) {
            MASK.to_string()
        } else {
            value.to_str().unwrap_or("<non-utf8>").to_string()
        };
        map.insert(name.as_str().to_string(), Value::String(rendered));
    }
    Value::Object(map)
}

/// Parse a JSON body and mask sensitive fields; non-JSON payloads are
/// logged as raw text.
fn mask_json(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut value) => {
            mask_value(&mut value);
            value
        }
        Err(_) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Recursively mask sensitive keys through nested objects and arrays.
fn mask_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_sensitive(key) {
                    *nested = Value::String(MASK.to_string());
                } else {
                    mask_value(nested);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                mask_value(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use serde_json::json;

    #[test]
    fn test_mask_json_top_level() {
        let body = br#"{"password":"x","email":"a@b.com"}"#;
        let masked = mask_json(body);

        assert_eq!(masked["password"], json!(MASK));
        assert_eq!(masked["email"], json!("a@b.com"));
    }

    #[test]
    fn test_mask_json_nested_objects_and_arrays() {
        let body = serde_json::to_vec(&json!({
            "users": [
                {"email": "a@b.com", "password": "secret1"},
                {"profile": {"password_hash": "$argon2id$", "bio": "hi"}}
            ],
            "meta": {"x-api-key": "key123"}
        }))
        .unwrap();

        let masked = mask_json(&body);

        assert_eq!(masked["users"][0]["password"], json!(MASK));
        assert_eq!(masked["users"][0]["email"], json!("a@b.com"));
        assert_eq!(masked["users"][1]["profile"]["password_hash"], json!(MASK));
        assert_eq!(masked["users"][1]["profile"]["bio"], json!("hi"));
        assert_eq!(masked["meta"]["x-api-key"], json!(MASK));
    }

    #[test]
    fn test_mask_json_is_case_insensitive() {
        let body = br#"{"PASSWORD":"x","Password_Hash":"y","X-Api-Key":"z"}"#;
        let masked = mask_json(body);

        assert_eq!(masked["PASSWORD"], json!(MASK));
        assert_eq!(masked["Password_Hash"], json!(MASK));
        assert_eq!(masked["X-Api-Key"], json!(MASK));
    }

    #[test]
    fn test_mask_json_non_json_payload() {
        let masked = mask_json(b"plain text");
        assert_eq!(masked, json!("plain text"));
    }

    #[test]
    fn test_mask_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("key123"),
        );
        headers.insert(
            HeaderName::from_static("user-agent"),
            HeaderValue::from_static("curl/8.0"),
        );

        let masked = mask_headers(&headers);

        assert_eq!(masked["x-api-key"], json!(MASK));
        assert_eq!(masked["user-agent"], json!("curl/8.0"));
    }
}
