//! HTTP client for the Zoho CRM REST API
//!
//! Holds the shared `reqwest::Client`, the retry policy and the pacing
//! configuration. Endpoint-specific calls live next to their models:
//! `auth` (token exchange), `query` (custom views), `metadata` (fields) and
//! `operations` (bulk writes).

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::constants::API_VERSION;
use super::error::ApiError;
use super::models::AuthSession;
use super::resilience::{ApiLogger, ResilienceConfig, RetryPolicy};

/// Zoho CRM API client
#[derive(Debug, Clone)]
pub struct ZohoClient {
    http: Client,
    retry: RetryPolicy,
    resilience: ResilienceConfig,
}

impl ZohoClient {
    pub fn new(resilience: ResilienceConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(resilience.request_timeout)
            .user_agent(concat!("zoho-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            retry: RetryPolicy::new(resilience.retry.clone()),
            resilience,
        })
    }

    pub fn resilience(&self) -> &ResilienceConfig {
        &self.resilience
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// `{api_domain}/crm/v8/{path}`
    pub(crate) fn crm_url(&self, session: &AuthSession, path: &str) -> String {
        format!(
            "{}/crm/{}/{}",
            session.api_domain().trim_end_matches('/'),
            API_VERSION,
            path.trim_start_matches('/')
        )
    }

    /// Authenticated GET through the retry policy
    pub(crate) async fn get(
        &self,
        session: &AuthSession,
        logger: &ApiLogger,
        label: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response, ApiError> {
        let url = self.crm_url(session, path);
        let auth = session.authorization();
        self.retry
            .send(logger, label, || {
                self.http
                    .get(&url)
                    .header(AUTHORIZATION, &auth)
                    .query(query)
                    .send()
            })
            .await
    }

    /// Authenticated PUT with a JSON body through the retry policy
    pub(crate) async fn put_json(
        &self,
        session: &AuthSession,
        logger: &ApiLogger,
        label: &str,
        path: &str,
        body: &Value,
    ) -> Result<Response, ApiError> {
        let url = self.crm_url(session, path);
        let auth = session.authorization();
        self.retry
            .send(logger, label, || {
                self.http
                    .put(&url)
                    .header(AUTHORIZATION, &auth)
                    .json(body)
                    .send()
            })
            .await
    }
}

/// Read a response body as JSON.
///
/// An empty body (Zoho answers 204 for empty result sets) decodes as `Null`.
pub(crate) async fn read_json(response: Response, logger: &ApiLogger) -> Result<Value, ApiError> {
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Decode(logger.redact(&e.to_string())))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Read a response body into a typed model
pub(crate) async fn read_typed<T: DeserializeOwned>(
    response: Response,
    logger: &ApiLogger,
) -> Result<T, ApiError> {
    let value = read_json(response, logger).await?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resilience::SecretSet;

    #[test]
    fn test_crm_url() {
        let client = ZohoClient::new(ResilienceConfig::disabled()).unwrap();
        let session = AuthSession::new(
            "tok".to_string(),
            "https://www.zohoapis.com/".to_string(),
            SecretSet::new(),
        );
        assert_eq!(
            client.crm_url(&session, "Leads"),
            "https://www.zohoapis.com/crm/v8/Leads"
        );
        assert_eq!(
            client.crm_url(&session, "/settings/fields"),
            "https://www.zohoapis.com/crm/v8/settings/fields"
        );
    }
}
