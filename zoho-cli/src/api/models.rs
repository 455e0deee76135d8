//! Credential and session models

use super::constants::{DEFAULT_ACCOUNTS_URL, DEFAULT_API_DOMAIN};
use super::error::ApiError;
use super::resilience::SecretSet;

/// Credential fields as supplied by one source (CLI flags, environment, ...).
///
/// Every field is optional; `CredentialSet::resolve` layers two of these.
#[derive(Debug, Clone, Default)]
pub struct PartialCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub api_domain: Option<String>,
    pub accounts_url: Option<String>,
}

/// Fully resolved credentials for one operation
#[derive(Clone)]
pub struct CredentialSet {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub accounts_url: String,
    pub api_domain: String,
}

// Never print secrets through Debug
impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("refresh_token", &"***")
            .field("accounts_url", &self.accounts_url)
            .field("api_domain", &self.api_domain)
            .finish()
    }
}

fn pick(primary: &Option<String>, fallback: &Option<String>) -> Option<String> {
    let non_empty = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    non_empty(primary).or_else(|| non_empty(fallback))
}

impl CredentialSet {
    /// Layer `overrides` on top of `defaults`, field by field.
    ///
    /// Missing endpoints fall back to the public Zoho US data center. Missing
    /// secrets stay empty and are rejected by `validate`.
    pub fn resolve(overrides: &PartialCredentials, defaults: &PartialCredentials) -> Self {
        Self {
            client_id: pick(&overrides.client_id, &defaults.client_id).unwrap_or_default(),
            client_secret: pick(&overrides.client_secret, &defaults.client_secret)
                .unwrap_or_default(),
            refresh_token: pick(&overrides.refresh_token, &defaults.refresh_token)
                .unwrap_or_default(),
            accounts_url: pick(&overrides.accounts_url, &defaults.accounts_url)
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string()),
            api_domain: pick(&overrides.api_domain, &defaults.api_domain)
                .map(|d| d.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_DOMAIN.to_string()),
        }
    }

    /// Fail with a configuration error naming every missing credential
    pub fn validate(&self) -> Result<(), ApiError> {
        let missing: Vec<&str> = [
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
            ("refresh token", &self.refresh_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Configuration(format!(
                "missing Zoho {} (set them in .env or pass them as flags)",
                missing.join(", ")
            )))
        }
    }

    /// Secrets known before the token exchange
    pub fn secrets(&self) -> SecretSet {
        SecretSet::new()
            .with(self.client_secret.clone())
            .with(self.refresh_token.clone())
    }
}

/// Result of one token exchange: everything an operation needs to talk to
/// the CRM, including the strings its logger must redact
#[derive(Clone)]
pub struct AuthSession {
    access_token: String,
    api_domain: String,
    secrets: SecretSet,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"***")
            .field("api_domain", &self.api_domain)
            .field("secrets", &self.secrets.len())
            .finish()
    }
}

impl AuthSession {
    pub fn new(access_token: String, api_domain: String, secrets: SecretSet) -> Self {
        let secrets = secrets.with(access_token.clone());
        Self {
            access_token,
            api_domain,
            secrets,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn api_domain(&self) -> &str {
        &self.api_domain
    }

    pub fn secrets(&self) -> &SecretSet {
        &self.secrets
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Zoho-oauthtoken {}", self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(id: &str, secret: &str, refresh: &str) -> PartialCredentials {
        PartialCredentials {
            client_id: Some(id.to_string()),
            client_secret: Some(secret.to_string()),
            refresh_token: Some(refresh.to_string()),
            api_domain: None,
            accounts_url: None,
        }
    }

    #[test]
    fn test_overrides_win_per_field() {
        let defaults = partial("env-id", "env-secret", "env-refresh");
        let overrides = PartialCredentials {
            client_id: Some("flag-id".to_string()),
            client_secret: Some("  ".to_string()),
            api_domain: Some("https://www.zohoapis.eu/".to_string()),
            ..Default::default()
        };

        let creds = CredentialSet::resolve(&overrides, &defaults);
        assert_eq!(creds.client_id, "flag-id");
        assert_eq!(creds.client_secret, "env-secret");
        assert_eq!(creds.refresh_token, "env-refresh");
        assert_eq!(creds.api_domain, "https://www.zohoapis.eu");
        assert_eq!(creds.accounts_url, DEFAULT_ACCOUNTS_URL);
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_validate_names_missing_fields() {
        let creds = CredentialSet::resolve(&PartialCredentials::default(), &partial("id", "", ""));
        let err = creds.validate().unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert!(msg.contains("client secret"));
        assert!(msg.contains("refresh token"));
        assert!(!msg.contains("client id"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = CredentialSet::resolve(&partial("id", "top-secret", "r-token"), &Default::default());
        let out = format!("{:?}", creds);
        assert!(!out.contains("top-secret"));
        assert!(!out.contains("r-token"));
    }

    #[test]
    fn test_session_secrets_include_token() {
        let creds = CredentialSet::resolve(&partial("id", "sec", "ref"), &Default::default());
        let session = AuthSession::new(
            "1000.token".to_string(),
            creds.api_domain.clone(),
            creds.secrets(),
        );
        assert_eq!(session.secrets().len(), 3);
        assert_eq!(session.authorization(), "Zoho-oauthtoken 1000.token");
        assert_eq!(
            session.secrets().redact("sec ref 1000.token"),
            "[REDACTED] [REDACTED] [REDACTED]"
        );
    }
}
