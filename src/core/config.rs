//! Configuration management for the Gemini proxy.
//!
//! All settings come from the process environment (optionally seeded from a
//! `.env` file). Configuration is read once at start-up and is immutable
//! afterwards.

use anyhow::{Context, Result};
use std::collections::HashMap;

/// Default upstream: the Gemini API's OpenAI compatibility endpoint.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Environment name that enables diagnostic traces in error responses.
pub const DEVELOPMENT_ENVIRONMENT: &str = "development";

const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Base URL requests are forwarded to, without a trailing slash
    pub upstream_base_url: String,

    /// Deployment environment name (`development`, `production`, ...)
    pub environment: String,

    /// Whether to verify SSL certificates for upstream requests
    pub verify_ssl: bool,

    /// Optional overall timeout for upstream requests
    pub request_timeout_secs: Option<u64>,

    /// Maximum accepted inbound body size
    pub max_body_bytes: usize,
}

/// Server-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            environment: default_environment(),
            verify_ssl: true,
            request_timeout_secs: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "production".to_string()
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gemini_openai_proxy::core::config::AppConfig;
    ///
    /// let config = AppConfig::from_env().expect("Failed to load config");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build configuration from an explicit variable map.
    ///
    /// Unset variables keep their defaults; malformed numeric values are
    /// reported as errors.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Some(host) = non_empty(&vars, "HOST") {
            config.server.host = host.to_string();
        }

        if let Some(port) = non_empty(&vars, "PORT") {
            config.server.port = port
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }

        if let Some(base) = non_empty(&vars, "UPSTREAM_BASE_URL") {
            config.upstream_base_url = base.trim_end_matches('/').to_string();
        }

        // NODE_ENV wins so existing deployments keep their switch
        if let Some(env) = non_empty(&vars, "NODE_ENV").or_else(|| non_empty(&vars, "APP_ENV")) {
            config.environment = env.to_string();
        }

        if let Some(verify_ssl) = non_empty(&vars, "VERIFY_SSL") {
            config.verify_ssl = str_to_bool(verify_ssl);
        }

        if let Some(timeout) = non_empty(&vars, "REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = Some(
                timeout
                    .parse::<u64>()
                    .with_context(|| format!("Invalid REQUEST_TIMEOUT_SECS value: {}", timeout))?,
            );
        }

        if let Some(limit) = non_empty(&vars, "MAX_BODY_BYTES") {
            config.max_body_bytes = limit
                .parse::<usize>()
                .with_context(|| format!("Invalid MAX_BODY_BYTES value: {}", limit))?;
        }

        Ok(config)
    }

    /// Whether error responses may carry diagnostic traces.
    pub fn is_development(&self) -> bool {
        self.environment
            .trim()
            .eq_ignore_ascii_case(DEVELOPMENT_ENVIRONMENT)
    }
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
