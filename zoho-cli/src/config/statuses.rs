//! Closed set of target values accepted for the status field

use crate::api::ApiError;

/// Lead statuses accepted when no catalog is configured
pub const DEFAULT_STATUSES: &[&str] = &[
    "Not Contacted",
    "Self Storage Questions Sent",
    "Move Questionnaire Sent",
    "Move Questionnaire Follow Up",
    "Move Questionnaire Completed",
    "Onsite Survey Booked",
    "On Hold",
    "Duplicate Lead",
    "Closed Lost",
    "Junk Lead",
    "Not Qualified",
];

/// The closed enumeration of valid status values.
///
/// Matching is exact and case-sensitive on the trimmed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCatalog {
    values: Vec<String>,
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_STATUSES.iter().map(|s| s.to_string()))
    }
}

impl StatusCatalog {
    pub fn new(values: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.trim().to_string();
            if !value.is_empty() && !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self { values: unique }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        let value = value.trim();
        self.values.iter().any(|v| v == value)
    }

    /// Check every value, collecting all unknown ones.
    ///
    /// Empty values are skipped: they are malformed rows, reported per record
    /// by the updater rather than rejected up front.
    pub fn validate<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Result<(), ApiError> {
        let mut invalid: Vec<String> = Vec::new();
        for value in values {
            let trimmed = value.trim();
            if trimmed.is_empty() || self.contains(trimmed) {
                continue;
            }
            if !invalid.iter().any(|v| v == trimmed) {
                invalid.push(trimmed.to_string());
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation { invalid })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = StatusCatalog::default();
        assert_eq!(catalog.values().len(), 11);
        assert!(catalog.contains("Junk Lead"));
        assert!(catalog.contains("  Junk Lead "));
        assert!(!catalog.contains("junk lead"));
    }

    #[test]
    fn test_validate_collects_all_invalid_values() {
        let catalog = StatusCatalog::default();
        let err = catalog
            .validate(["Junk Lead", "Hot", "", "Cold", "Hot"])
            .unwrap_err();

        match err {
            ApiError::Validation { invalid } => {
                assert_eq!(invalid, vec!["Hot".to_string(), "Cold".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_custom_catalog_dedupes() {
        let catalog = StatusCatalog::new(vec![
            "Open".to_string(),
            " Open ".to_string(),
            "".to_string(),
            "Closed".to_string(),
        ]);
        assert_eq!(catalog.values(), &["Open".to_string(), "Closed".to_string()]);
        assert!(catalog.validate(["Open", "Closed"]).is_ok());
    }
}
