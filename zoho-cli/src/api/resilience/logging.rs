//! Operation-scoped API logging with secret redaction
//!
//! Every top-level operation (token exchange, view fetch, bulk update) owns an
//! `ApiLogger`. The logger carries a correlation id and the set of strings that
//! must never reach the log output for the lifetime of that operation.

use log::Level;
use uuid::Uuid;

const REDACTED: &str = "[REDACTED]";

/// Strings that must be scrubbed from log lines and error messages
#[derive(Debug, Clone, Default)]
pub struct SecretSet {
    secrets: Vec<String>,
}

impl SecretSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret. Empty strings are ignored.
    pub fn insert(&mut self, secret: impl Into<String>) {
        let secret = secret.into();
        if secret.is_empty() || self.secrets.contains(&secret) {
            return;
        }
        self.secrets.push(secret);
        // Longest first so a secret containing another is scrubbed whole
        self.secrets.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    pub fn with(mut self, secret: impl Into<String>) -> Self {
        self.insert(secret);
        self
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Replace every known secret in `text`
    pub fn redact(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        let mut out = text.to_string();
        for secret in &self.secrets {
            if out.contains(secret.as_str()) {
                out = out.replace(secret.as_str(), REDACTED);
            }
        }
        out
    }
}

/// Logger bound to one operation
#[derive(Debug, Clone)]
pub struct ApiLogger {
    operation_id: String,
    secrets: SecretSet,
}

impl ApiLogger {
    pub fn new(secrets: SecretSet) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            operation_id: id[..8].to_string(),
            secrets,
        }
    }

    /// Logger for a follow-up step that shares this operation's correlation id
    pub fn with_secrets(&self, secrets: SecretSet) -> Self {
        Self {
            operation_id: self.operation_id.clone(),
            secrets,
        }
    }

    pub fn redact(&self, text: &str) -> String {
        self.secrets.redact(text)
    }

    pub fn log(&self, level: Level, message: &str) {
        log::log!(level, "[{}] {}", self.operation_id, self.redact(message));
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}
