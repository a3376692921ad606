//! Core functionality for the Gemini proxy.
//!
//! This module contains the ambient components used by the handler:
//! - Configuration management
//! - Error handling
//! - Logging and request context
//! - Stream completion tracking

pub mod completion;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use completion::RelayCompletion;
pub use config::{AppConfig, ServerConfig};
pub use error::{AppError, Result};
pub use logging::{generate_request_id, get_request_id, init_tracing, REQUEST_ID};
