//! API layer for the Gemini proxy.
//!
//! This module contains the forwarding handler, outbound request
//! construction, and the streaming relay.

pub mod disconnect;
pub mod proxy;
pub mod streaming;
pub mod upstream;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

// Re-export commonly used types
pub use proxy::{preflight_response, proxy_handler, AppState};
pub use streaming::create_sse_response;
pub use upstream::{build_upstream_url, rewrite_path, OPENAI_COMPAT_PREFIX};

/// Build the router: every method on every path goes to [`proxy_handler`].
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .fallback(proxy_handler)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
