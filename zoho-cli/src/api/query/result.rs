//! Page envelope returned by record list endpoints

use serde_json::Value;

/// One page of a record listing: `{"data": [...], "info": {"more_records": bool}}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewPage {
    pub records: Vec<Value>,
    pub more_records: bool,
}

impl ViewPage {
    /// Lenient parse: a missing or non-list `data` yields zero records, a
    /// missing `more_records` flag is treated as false.
    pub fn from_value(value: &Value) -> Self {
        let records = value
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let more_records = value
            .get("info")
            .and_then(|info| info.get("more_records"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            records,
            more_records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Identifier of a record, accepting both string and numeric JSON ids
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Identifiers of all records that carry one, in order
pub fn record_ids(records: &[Value]) -> Vec<String> {
    records.iter().filter_map(record_id).collect()
}
