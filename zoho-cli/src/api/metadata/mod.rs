//! Module field metadata

pub mod models;

pub use models::{FieldMetadata, FieldType, PickListValue};

use super::client::{ZohoClient, read_typed};
use super::error::ApiError;
use super::models::AuthSession;
use super::resilience::ApiLogger;
use models::FieldsResponse;

impl ZohoClient {
    /// List the updatable fields of a module.
    ///
    /// One request, no pagination. Read-only fields are left out.
    pub async fn fetch_fields(
        &self,
        session: &AuthSession,
        module: &str,
    ) -> Result<Vec<FieldMetadata>, ApiError> {
        let logger = ApiLogger::new(session.secrets().clone());
        let query = [("module", module.to_string())];
        let label = format!("fields of {}", module);

        let response = self
            .get(session, &logger, &label, "settings/fields", &query)
            .await?;
        let body: FieldsResponse = read_typed(response, &logger).await?;

        let fields: Vec<FieldMetadata> = body.fields.into_iter().filter(|f| !f.read_only).collect();
        logger.info(&format!("{} updatable field(s) in {}", fields.len(), module));
        Ok(fields)
    }
}

/// Find a field by API name (case-insensitive)
pub fn find_field<'a>(fields: &'a [FieldMetadata], api_name: &str) -> Option<&'a FieldMetadata> {
    fields
        .iter()
        .find(|f| f.api_name.eq_ignore_ascii_case(api_name))
}
