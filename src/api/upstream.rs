//! Outbound request construction.
//!
//! Everything the proxy sends upstream is derived here: the rewritten URL,
//! the minimal header set, the method and the JSON body.

use crate::core::{AppConfig, AppError, Result};
use axum::http::{header, HeaderMap, Method};
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;

/// Path prefix clients already carry when pointed at the upstream layout.
pub const OPENAI_COMPAT_PREFIX: &str = "/v1beta/openai";

/// Accept value used when the caller sends none.
pub const DEFAULT_ACCEPT: &str = "application/json";

/// Strip the OpenAI compatibility prefix once, if the path starts with it.
pub fn rewrite_path(path: &str) -> &str {
    path.strip_prefix(OPENAI_COMPAT_PREFIX).unwrap_or(path)
}

/// Resolve `.` and `..` segments the way a URL parser does.
///
/// Runs before the prefix check, so `/v1beta/openai/../x` becomes `/v1beta/x`
/// and is then appended unchanged.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    match reqwest::Url::parse("http://localhost") {
        Ok(mut url) => {
            url.set_path(path);
            Cow::Owned(url.path().to_string())
        }
        Err(_) => Cow::Borrowed(path),
    }
}

/// Concatenate base, rewritten path and the untouched query string.
pub fn build_upstream_url(upstream_base: &str, path: &str, query: Option<&str>) -> String {
    let normalized = normalize_path(path);
    let path = rewrite_path(&normalized);
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{}{}?{}", upstream_base, path, q),
        None => format!("{}{}", upstream_base, path),
    }
}

/// Build the outbound header set.
///
/// Only `Authorization` (when present), `Content-Type` and `Accept` are
/// sent; every other inbound header is dropped.
pub fn build_upstream_headers(inbound: &HeaderMap) -> Result<reqwest::header::HeaderMap> {
    let mut headers = reqwest::header::HeaderMap::new();

    if let Some(auth) = inbound.get(header::AUTHORIZATION) {
        headers.insert(
            reqwest::header::AUTHORIZATION,
            header_value(auth.as_bytes())?,
        );
    }

    headers.insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let accept = inbound
        .get(header::ACCEPT)
        .map(|v| v.as_bytes())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_ACCEPT.as_bytes());
    headers.insert(reqwest::header::ACCEPT, header_value(accept)?);

    Ok(headers)
}

fn header_value(bytes: &[u8]) -> Result<reqwest::header::HeaderValue> {
    reqwest::header::HeaderValue::from_bytes(bytes)
        .map_err(|e| AppError::Internal(format!("Invalid header value: {}", e)))
}

/// Parse the inbound body into an opaque JSON document.
///
/// An empty body is treated as `{}`; anything else must be valid JSON,
/// whatever the method.
pub fn parse_inbound_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// A request streams iff its body carries `"stream": true` (boolean).
pub fn is_streaming_request(body: &Value) -> bool {
    matches!(body.get("stream"), Some(Value::Bool(true)))
}

/// Build the outbound request with the caller's method.
///
/// `GET` requests go out without a body; every other method carries the
/// serialized payload.
pub fn build_upstream_request(
    client: &reqwest::Client,
    method: &Method,
    url: &str,
    headers: reqwest::header::HeaderMap,
    payload: &Value,
) -> Result<reqwest::RequestBuilder> {
    let send_body = *method != Method::GET;
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid method: {}", e)))?;

    let mut builder = client.request(method, url).headers(headers);
    if send_body {
        builder = builder.body(serde_json::to_vec(payload)?);
    }

    Ok(builder)
}

/// Create HTTP client with connection pooling
pub fn create_http_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .http2_keep_alive_timeout(Duration::from_secs(10));

    if let Some(timeout) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    builder.build()
}
