//! Gateway configuration.
//!
//! Every knob for reaching the remote form service lives in
//! [`GatewayConfig`], built via its builder. Keeping the endpoint and the
//! timeouts in one struct makes it trivial to log a run's configuration and
//! to point tests at a local mock server.

use crate::error::PipelineError;
use serde::Serialize;

/// Where the remote form service lives and how long we wait for it.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayConfig {
    /// Base URL of the service API, e.g. `http://localhost:8000/api`.
    /// Stored without a trailing slash.
    pub base_url: String,

    /// Timeout for extraction, upload, catalog, and PDF-fill calls, in
    /// seconds. Default: 120. OCR on a multi-page scan can take tens of
    /// seconds; a too-small value turns slow extractions into spurious
    /// failures.
    pub request_timeout_secs: u64,

    /// Timeout for the URL-fill call, in seconds. Default: 180.
    ///
    /// The URL filler drives a real browser and deliberately keeps the page
    /// open for a review window (about a minute) before it responds, so this
    /// timeout must comfortably exceed that window; it is not a latency
    /// bound but a session bound.
    pub fill_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 120,
            fill_timeout_secs: 180,
        }
    }
}

impl GatewayConfig {
    /// Create a new builder.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder {
            config: GatewayConfig::default(),
        }
    }
}

/// Builder for [`GatewayConfig`].
#[derive(Debug)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn fill_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fill_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GatewayConfig, PipelineError> {
        let c = &self.config;
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(PipelineError::InvalidConfig(format!(
                "base_url must be an http/https address, got '{}'",
                c.base_url
            )));
        }
        if c.fill_timeout_secs <= 60 {
            return Err(PipelineError::InvalidConfig(format!(
                "fill_timeout_secs must exceed the filler's ~60s review window, got {}",
                c.fill_timeout_secs
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_trailing_slash() {
        let config = GatewayConfig::builder()
            .base_url("http://localhost:8000/api/")
            .build()
            .unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn builder_rejects_non_http_base() {
        let err = GatewayConfig::builder()
            .base_url("localhost:8000/api")
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_fill_timeout_inside_review_window() {
        let err = GatewayConfig::builder()
            .fill_timeout_secs(30)
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }
}
