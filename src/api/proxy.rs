//! The forwarding handler.
//!
//! Every inbound request (any method, any path) lands here. `OPTIONS` is
//! answered locally; everything else is rewritten, sent upstream, and the
//! upstream answer is relayed either live (streaming) or buffered as JSON.

use crate::api::streaming::create_sse_response;
use crate::api::upstream::{
    build_upstream_headers, build_upstream_request, build_upstream_url, create_http_client,
    is_streaming_request, parse_inbound_body,
};
use crate::core::logging::{generate_request_id, get_request_id, mask_headers, REQUEST_ID};
use crate::core::{AppConfig, AppError, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build state with an HTTP client derived from the configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let http_client = create_http_client(&config)?;
        Ok(Self::new(config, http_client))
    }
}

/// Answer a CORS preflight without contacting the upstream.
pub fn preflight_response() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
        ],
    )
        .into_response()
}

/// Proxy any request to the upstream OpenAI compatibility endpoint.
///
/// Failures never escape: they are logged and rendered as JSON error
/// responses, with a diagnostic trace in development.
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight_response();
    }

    let request_id = generate_request_id();
    let include_trace = state.config.is_development();

    REQUEST_ID
        .scope(request_id.clone(), async move {
            match forward(&state, &method, &uri, &headers, &body).await {
                Ok(response) => response,
                Err(e) => {
                    match &e {
                        AppError::InvalidJsonResponse { .. } => {
                            // Already logged together with the parse error
                        }
                        AppError::BadRequest(message) => tracing::warn!(
                            request_id = %request_id,
                            error = %message,
                            "Rejected request body"
                        ),
                        other => tracing::error!(
                            request_id = %request_id,
                            error = %other,
                            error_source = ?other.source(),
                            "Proxy request failed"
                        ),
                    }
                    e.into_error_response(include_trace)
                }
            }
        })
        .await
}

async fn forward(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Response> {
    let request_id = get_request_id();
    let payload = parse_inbound_body(body)?;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %uri,
        headers = %mask_headers(headers),
        body = %payload,
        "Incoming request"
    );

    let url = build_upstream_url(&state.config.upstream_base_url, uri.path(), uri.query());
    tracing::info!(request_id = %request_id, url = %url, "Forwarding request");

    let upstream_headers = build_upstream_headers(headers)?;
    let is_streaming = is_streaming_request(&payload);

    let response = build_upstream_request(
        &state.http_client,
        method,
        &url,
        upstream_headers,
        &payload,
    )?
    .send()
    .await
    .map_err(|e| {
        tracing::error!(
            request_id = %request_id,
            url = %url,
            error = %e,
            error_source = ?e.source(),
            is_timeout = e.is_timeout(),
            is_connect = e.is_connect(),
            "HTTP request failed to upstream"
        );
        AppError::from(e)
    })?;

    let status = response.status().as_u16();
    tracing::info!(
        request_id = %request_id,
        status = status,
        stream = is_streaming,
        "Upstream response status"
    );

    if is_streaming {
        return Ok(create_sse_response(response, request_id));
    }

    let response_text = response.text().await?;
    tracing::info!(
        request_id = %request_id,
        body = %response_text,
        "Upstream response body"
    );

    let data: Value = match serde_json::from_str(&response_text) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error = %e,
                "Failed to parse upstream response as JSON"
            );
            return Err(AppError::InvalidJsonResponse { response_text });
        }
    };

    let status = StatusCode::from_u16(status)
        .map_err(|e| AppError::Internal(format!("Invalid upstream status: {}", e)))?;

    Ok((status, Json(data)).into_response())
}
