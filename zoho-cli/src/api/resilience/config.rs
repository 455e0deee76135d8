//! Resilience configuration with builder pattern
//!
//! Provides a unified configuration for retry policies, page pacing and
//! request timeouts with sane defaults.

use super::retry::RetryConfig;
use crate::config::Settings;
use std::time::Duration;

/// Global resilience configuration for API operations
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    /// Timeout applied to every individual HTTP request
    pub request_timeout: Duration,
}

/// Pacing between consecutive page requests
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Delay inserted between pages of a full view export
    pub page_delay: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(500),
        }
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ResilienceConfig {
    /// Create a new builder for ResilienceConfig
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// Single attempt, no waiting anywhere
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig {
                max_attempts: 1,
                base_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
                backoff_multiplier: 1.0,
                jitter: false,
            },
            pacing: PacingConfig {
                page_delay: Duration::ZERO,
            },
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Build from the `[retry]` table and pacing keys of the settings file
    pub fn from_settings(settings: &Settings) -> Self {
        let retry = &settings.retry;
        Self {
            retry: RetryConfig {
                max_attempts: retry.max_attempts.max(1),
                base_delay: Duration::from_millis(retry.base_delay_ms),
                max_delay: Duration::from_millis(retry.max_delay_ms),
                backoff_multiplier: retry.backoff_multiplier,
                jitter: retry.jitter,
            },
            pacing: PacingConfig {
                page_delay: Duration::from_millis(settings.page_delay_ms),
            },
            request_timeout: Duration::from_secs(settings.timeout_secs.max(1)),
        }
    }
}

/// Builder for ResilienceConfig
#[derive(Debug)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
        }
    }

    /// Configure retry behavior
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set max attempts per call
    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    /// Set the first backoff delay
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.retry.base_delay = delay;
        self
    }

    /// Set the delay between view pages
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.config.pacing.page_delay = delay;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

impl Default for ResilienceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
