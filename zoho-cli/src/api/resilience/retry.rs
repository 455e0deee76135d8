//! Retry policy with exponential backoff
//!
//! Wraps every outbound call. 429 and 5xx responses as well as transport
//! failures are retried up to `max_attempts`; any other non-2xx fails
//! immediately.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use reqwest::{Response, StatusCode};
use serde_json::Value;

use super::logging::ApiLogger;
use crate::api::error::ApiError;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Upper bound for a single backoff delay
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Randomize each delay into [delay/2, delay]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Backoff delay after the given (1-based) failed attempt:
    /// `base_delay * multiplier^(attempt-1)`, capped at `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let secs = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64()).max(0.0);

        let secs = if self.jitter && capped > 0.0 {
            rand::rng().random_range(capped / 2.0..=capped)
        } else {
            capped
        };

        Duration::from_secs_f64(secs)
    }
}

/// Transient failure classes that are worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableError {
    RateLimited,
    ServerError(StatusCode),
    Transport,
}

impl RetryableError {
    pub fn from_status(status: StatusCode) -> Option<Self> {
        if status == StatusCode::TOO_MANY_REQUESTS {
            Some(Self::RateLimited)
        } else if status.is_server_error() {
            Some(Self::ServerError(status))
        } else {
            None
        }
    }
}

impl fmt::Display for RetryableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryableError::RateLimited => write!(f, "rate limited (429)"),
            RetryableError::ServerError(status) => write!(f, "server error ({})", status.as_u16()),
            RetryableError::Transport => write!(f, "transport failure"),
        }
    }
}

/// Executes requests under a `RetryConfig`
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Send a request, rebuilding it through `request` on every attempt.
    ///
    /// Returns the first 2xx response. There is no sleep after the final
    /// attempt.
    pub async fn send<F, Fut>(
        &self,
        logger: &ApiLogger,
        label: &str,
        mut request: F,
    ) -> Result<Response, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = reqwest::Result<Response>>,
    {
        let max_attempts = self.max_attempts();
        let mut last_status = None;

        for attempt in 1..=max_attempts {
            logger.debug(&format!("{} attempt {}/{}", label, attempt, max_attempts));

            let failure = match request().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    match RetryableError::from_status(status) {
                        Some(kind) => {
                            last_status = Some(status);
                            kind
                        }
                        None => {
                            let body = response.text().await.unwrap_or_default();
                            let body = logger.redact(&body);
                            logger.warn(&format!("{} failed with {}: {}", label, status, body));
                            return Err(remote_error(status, body));
                        }
                    }
                }
                Err(err) => {
                    let message = logger.redact(&err.to_string());
                    logger.error(&format!(
                        "{} request failed on attempt {}/{}: {}",
                        label, attempt, max_attempts, message
                    ));
                    if attempt == max_attempts {
                        return Err(ApiError::Transport {
                            attempts: max_attempts,
                            message,
                        });
                    }
                    RetryableError::Transport
                }
            };

            if attempt < max_attempts {
                let wait = self.config.delay_for_attempt(attempt);
                logger.warn(&format!(
                    "{} {} on attempt {}/{}, backing off {:.1}s",
                    label,
                    failure,
                    attempt,
                    max_attempts,
                    wait.as_secs_f64()
                ));
                tokio::time::sleep(wait).await;
            } else {
                logger.warn(&format!(
                    "{} {} on final attempt {}/{}",
                    label, failure, attempt, max_attempts
                ));
            }
        }

        Err(ApiError::RetriesExhausted {
            status: last_status.unwrap_or(StatusCode::SERVICE_UNAVAILABLE),
            attempts: max_attempts,
        })
    }
}

/// Build a `Remote` error from a non-retryable response body.
///
/// Zoho API errors look like `{"code": "...", "message": "..."}`; the
/// accounts server uses `{"error": "..."}` instead.
pub(crate) fn remote_error(status: StatusCode, body: String) -> ApiError {
    let parsed: Option<Value> = serde_json::from_str(&body).ok();
    let field = |key: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let code = field("code")
        .or_else(|| field("error"))
        .unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));
    let message = field("message")
        .or_else(|| field("error_description"))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.chars().take(200).collect()
            }
        });

    ApiError::Remote {
        status,
        code,
        message,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resilience::logging::SecretSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 2.0,
            jitter: false,
        })
    }

    #[test]
    fn test_default_backoff_schedule() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_capped_by_max_delay() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(5),
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let config = RetryConfig {
            jitter: true,
            ..RetryConfig::default()
        };
        for _ in 0..50 {
            let delay = config.delay_for_attempt(2);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(4));
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert_eq!(
            RetryableError::from_status(StatusCode::TOO_MANY_REQUESTS),
            Some(RetryableError::RateLimited)
        );
        assert_eq!(
            RetryableError::from_status(StatusCode::BAD_GATEWAY),
            Some(RetryableError::ServerError(StatusCode::BAD_GATEWAY))
        );
        assert_eq!(RetryableError::from_status(StatusCode::BAD_REQUEST), None);
        assert_eq!(RetryableError::from_status(StatusCode::UNAUTHORIZED), None);
    }

    #[test]
    fn test_remote_error_parsing() {
        let err = remote_error(
            StatusCode::UNAUTHORIZED,
            r#"{"code":"INVALID_TOKEN","message":"invalid oauth token","status":"error"}"#
                .to_string(),
        );
        match err {
            ApiError::Remote { code, message, .. } => {
                assert_eq!(code, "INVALID_TOKEN");
                assert_eq!(message, "invalid oauth token");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = remote_error(StatusCode::BAD_REQUEST, r#"{"error":"invalid_code"}"#.to_string());
        assert_eq!(err.record_code(), "invalid_code");

        let err = remote_error(StatusCode::FORBIDDEN, String::new());
        assert_eq!(err.record_code(), "HTTP_403");
        assert_eq!(err.record_message(), "Forbidden");
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/flaky", server.uri());
        let logger = ApiLogger::new(SecretSet::new());

        let response = fast_policy(3)
            .send(&logger, "flaky", || http.get(&url).send())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_exhausted_reports_last_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = server.uri();
        let logger = ApiLogger::new(SecretSet::new());

        let err = fast_policy(3)
            .send(&logger, "down", || http.get(&url).send())
            .await
            .unwrap_err();
        match err {
            ApiError::RetriesExhausted { status, attempts } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"code":"INVALID_DATA","message":"bad"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = server.uri();
        let logger = ApiLogger::new(SecretSet::new());

        let err = fast_policy(3)
            .send(&logger, "bad", || http.get(&url).send())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.record_code(), "INVALID_DATA");
    }

    #[tokio::test]
    async fn test_transport_failure_exhausts_attempts() {
        // Port 1 is closed, so every attempt fails to connect
        let url = "http://127.0.0.1:1/".to_string();

        let http = reqwest::Client::new();
        let logger = ApiLogger::new(SecretSet::new());
        let mut calls = 0;

        let err = fast_policy(3)
            .send(&logger, "unreachable", || {
                calls += 1;
                http.get(&url).send()
            })
            .await
            .unwrap_err();

        assert_eq!(calls, 3);
        match err {
            ApiError::Transport { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
