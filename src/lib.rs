//! Gemini OpenAI-compatibility proxy
//!
//! A thin forwarding proxy in front of the Gemini API's OpenAI compatibility
//! endpoint:
//!
//! - **Path rewriting**: a leading `/v1beta/openai` is stripped before the
//!   path is appended to the upstream base URL
//! - **Header minimization**: only `Authorization`, `Content-Type` and
//!   `Accept` are forwarded
//! - **Streaming Support**: requests with `"stream": true` are relayed live
//!   as Server-Sent Events
//! - **CORS**: preflights are answered locally, every response allows any origin
//!
//! # Architecture
//!
//! - [`core`]: configuration, errors, logging and stream completion tracking
//! - [`api`]: the forwarding handler, outbound request construction and the
//!   streaming relay
//!
//! # Configuration
//!
//! All settings are optional environment variables:
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8080)
//! - `NODE_ENV` (or `APP_ENV`): `development` adds diagnostic traces to 500 responses
//! - `UPSTREAM_BASE_URL`: upstream base (default: the Gemini OpenAI endpoint)
//! - `VERIFY_SSL`: verify upstream certificates (default: true)
//! - `REQUEST_TIMEOUT_SECS`: overall upstream timeout (default: none)
//! - `MAX_BODY_BYTES`: inbound body limit (default: 32 MiB)

pub mod api;
pub mod core;

// Re-export commonly used types for convenience
pub use api::{build_router, proxy_handler, AppState};
pub use core::{AppConfig, AppError, Result};
