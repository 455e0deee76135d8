//! Production resilience features
//!
//! Provides retry policies, request pacing and operation-scoped, redacting
//! logging for Zoho CRM API interactions.

pub mod config;
pub mod logging;
pub mod retry;

pub use config::ResilienceConfig;
pub use logging::{ApiLogger, SecretSet};
pub use retry::{RetryConfig, RetryPolicy};
