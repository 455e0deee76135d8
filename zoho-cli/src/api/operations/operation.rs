//! Core types for bulk field updates

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::constants::{DEFAULT_MODULE, DEFAULT_STATUS_FIELD, codes};
use crate::api::error::ApiError;

/// One record to update: its identifier and the target field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRow {
    pub id: String,
    pub value: String,
}

impl UpdateRow {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// Rows for many ids sharing one target value
    pub fn many(ids: impl IntoIterator<Item = String>, value: &str) -> Vec<Self> {
        ids.into_iter().map(|id| Self::new(id, value)).collect()
    }

    /// A row is sendable when both id and value are non-blank
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.value.trim().is_empty()
    }
}

/// Which module and field a bulk update writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    pub module: String,
    pub field: String,
}

impl Default for UpdateTarget {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            field: DEFAULT_STATUS_FIELD.to_string(),
        }
    }
}

impl UpdateTarget {
    pub fn new(module: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            field: field.into(),
        }
    }

    /// JSON body for one write request
    pub fn request_body(&self, rows: &[&UpdateRow]) -> Value {
        let data: Vec<Value> = rows
            .iter()
            .map(|row| {
                let mut entry = serde_json::Map::new();
                entry.insert("id".to_string(), Value::String(row.id.trim().to_string()));
                entry.insert(self.field.clone(), Value::String(row.value.trim().to_string()));
                Value::Object(entry)
            })
            .collect();
        json!({ "data": data })
    }
}

/// Outcome of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultStatus::Success => write!(f, "success"),
            ResultStatus::Error => write!(f, "error"),
        }
    }
}

/// Per-record result of a bulk update. `code` is set iff the status is error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub id: String,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl UpdateResult {
    pub fn success(id: impl Into<String>, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            id: id.into(),
            status: ResultStatus::Success,
            code: None,
            message: message.into(),
            details,
        }
    }

    pub fn error(
        id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            status: ResultStatus::Error,
            code: Some(code.into()),
            message: message.into(),
            details,
        }
    }

    /// Result for a row that was never sent (blank id or value)
    pub fn invalid_row(row: &UpdateRow) -> Self {
        let missing = match (row.id.trim().is_empty(), row.value.trim().is_empty()) {
            (true, true) => "id and status",
            (true, false) => "id",
            _ => "status",
        };
        Self::error(
            row.id.trim(),
            codes::INVALID_INPUT_ROW,
            format!("Row is missing {}", missing),
            None,
        )
    }

    /// Result for a submitted id the API did not report on
    pub fn missing(id: impl Into<String>, chunk_error_code: Option<&str>) -> Self {
        let details = chunk_error_code.map(|code| json!({ "chunk_error_code": code }));
        Self::error(
            id,
            codes::MISSING_IN_RESPONSE,
            "No result returned for this record",
            details,
        )
    }

    /// Result for a record whose whole chunk failed
    pub fn from_chunk_error(id: impl Into<String>, error: &ApiError) -> Self {
        let details = error
            .status()
            .map(|status| json!({ "http_status": status.as_u16() }));
        Self::error(id, error.record_code(), error.record_message(), details)
    }

    /// Parse one entry of the write response's `data` array.
    ///
    /// The record id is taken from `id`, else `details.id`, else `fallback_id`
    /// (the id submitted at the same position).
    pub fn from_response_entry(entry: &Value, fallback_id: Option<&str>) -> Option<Self> {
        let text = |v: Option<&Value>| match v {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let details = entry.get("details").filter(|d| !d.is_null()).cloned();
        let id = text(entry.get("id"))
            .or_else(|| text(details.as_ref().and_then(|d| d.get("id"))))
            .or_else(|| fallback_id.map(str::to_string))?;

        let status = entry
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let code = text(entry.get("code"));
        let message = text(entry.get("message")).unwrap_or_default();

        if status.eq_ignore_ascii_case("success") {
            Some(Self::success(id, message, details))
        } else {
            Some(Self::error(
                id,
                code.unwrap_or_else(|| codes::UNKNOWN_ERROR.to_string()),
                message,
                details,
            ))
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let rows = [UpdateRow::new("101", "Junk Lead"), UpdateRow::new(" 102 ", "On Hold")];
        let refs: Vec<&UpdateRow> = rows.iter().collect();
        let body = UpdateTarget::default().request_body(&refs);

        assert_eq!(
            body,
            json!({"data": [
                {"id": "101", "Lead_Status": "Junk Lead"},
                {"id": "102", "Lead_Status": "On Hold"}
            ]})
        );
    }

    #[test]
    fn test_well_formed() {
        assert!(UpdateRow::new("1", "x").is_well_formed());
        assert!(!UpdateRow::new(" ", "x").is_well_formed());
        assert!(!UpdateRow::new("1", "").is_well_formed());
    }

    #[test]
    fn test_invalid_row_result() {
        let result = UpdateResult::invalid_row(&UpdateRow::new("7", ""));
        assert_eq!(result.code.as_deref(), Some("INVALID_INPUT_ROW"));
        assert_eq!(result.message, "Row is missing status");
        assert!(result.is_error());
    }

    #[test]
    fn test_parse_success_entry_with_details_id() {
        let entry = json!({
            "code": "SUCCESS",
            "details": {"Modified_Time": "2024-01-01T00:00:00+00:00", "id": "101"},
            "message": "record updated",
            "status": "success"
        });
        let result = UpdateResult::from_response_entry(&entry, None).unwrap();
        assert_eq!(result.id, "101");
        assert!(result.is_success());
        assert_eq!(result.code, None);
        assert_eq!(result.message, "record updated");
    }

    #[test]
    fn test_parse_error_entry_uses_fallback_id() {
        let entry = json!({
            "code": "INVALID_DATA",
            "details": {"api_name": "id"},
            "message": "the id given seems to be invalid",
            "status": "error"
        });
        let result = UpdateResult::from_response_entry(&entry, Some("999")).unwrap();
        assert_eq!(result.id, "999");
        assert_eq!(result.code.as_deref(), Some("INVALID_DATA"));

        assert!(UpdateResult::from_response_entry(&json!({"status": "error"}), None).is_none());
    }

    #[test]
    fn test_missing_keeps_chunk_code_as_context() {
        let result = UpdateResult::missing("5", Some("INVALID_DATA"));
        assert_eq!(result.code.as_deref(), Some("MISSING_IN_RESPONSE"));
        assert_eq!(result.details, Some(json!({"chunk_error_code": "INVALID_DATA"})));
        assert_eq!(UpdateResult::missing("5", None).details, None);
    }

    #[test]
    fn test_serialized_shape() {
        let ok = serde_json::to_value(UpdateResult::success("1", "record updated", None)).unwrap();
        assert_eq!(ok, json!({"id": "1", "status": "success", "message": "record updated"}));
    }
}
