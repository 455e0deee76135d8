//! Zoho CRM field metadata models

use serde::{Deserialize, Serialize};

/// Field metadata as returned by `settings/fields`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMetadata {
    /// API name used in request bodies (e.g., "Lead_Status")
    pub api_name: String,
    /// Display label (e.g., "Lead Status")
    #[serde(rename = "field_label", default)]
    pub label: String,
    #[serde(default)]
    pub data_type: FieldType,
    #[serde(default)]
    pub read_only: bool,
    /// Allowed values for picklist fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pick_list_values: Vec<PickListValue>,
}

/// Field data types in Zoho CRM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Phone,
    Picklist,
    Multiselectpicklist,
    Integer,
    Bigint,
    Double,
    Currency,
    Boolean,
    Date,
    Datetime,
    Lookup,
    Ownerlookup,
    #[default]
    #[serde(other)]
    Other,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Picklist => "picklist",
            FieldType::Multiselectpicklist => "multiselectpicklist",
            FieldType::Integer => "integer",
            FieldType::Bigint => "bigint",
            FieldType::Double => "double",
            FieldType::Currency => "currency",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Lookup => "lookup",
            FieldType::Ownerlookup => "ownerlookup",
            FieldType::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// One picklist option
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickListValue {
    pub display_value: String,
    #[serde(default)]
    pub actual_value: Option<String>,
}

impl PickListValue {
    /// Value to send when writing this option
    pub fn value(&self) -> &str {
        self.actual_value.as_deref().unwrap_or(&self.display_value)
    }
}

/// Envelope of the fields endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FieldsResponse {
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}
