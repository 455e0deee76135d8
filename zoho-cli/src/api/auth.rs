//! OAuth refresh-token exchange

use serde_json::Value;

use super::client::{ZohoClient, read_json};
use super::error::ApiError;
use super::models::{AuthSession, CredentialSet};
use super::resilience::ApiLogger;

impl ZohoClient {
    /// Exchange the refresh token for a short-lived access token.
    ///
    /// Performs exactly one exchange per call and never caches; callers hold
    /// on to the returned session for the duration of one operation.
    pub async fn get_access_token(&self, credentials: &CredentialSet) -> Result<AuthSession, ApiError> {
        let logger = ApiLogger::new(credentials.secrets());
        self.authenticate(credentials, &logger).await
    }

    /// Token exchange logged under the caller's operation id
    pub(crate) async fn authenticate(
        &self,
        credentials: &CredentialSet,
        logger: &ApiLogger,
    ) -> Result<AuthSession, ApiError> {
        credentials.validate()?;

        logger.debug(&format!("Requesting access token from {}", credentials.accounts_url));

        let form = [
            ("refresh_token", credentials.refresh_token.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .retry()
            .send(logger, "token refresh", || {
                self.http()
                    .post(&credentials.accounts_url)
                    .form(&form)
                    .send()
            })
            .await
            .map_err(|e| ApiError::Auth(logger.redact(&e.to_string())))?;

        let body = read_json(response, logger)
            .await
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        match token {
            Some(token) => {
                logger.info("Access token obtained");
                Ok(AuthSession::new(
                    token.to_string(),
                    credentials.api_domain.clone(),
                    credentials.secrets(),
                ))
            }
            None => {
                let reason = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("response has no access_token");
                Err(ApiError::Auth(format!(
                    "token refresh failed: {}",
                    logger.redact(reason)
                )))
            }
        }
    }
}
