//! Validation results

use serde::Serialize;
use std::collections::BTreeMap;

/// Ordered error messages per field path.
///
/// A field absent from the map has no errors; a present field always has
/// at least one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of validating a set of values against a schema or step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "errors", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn from_errors(errors: FieldErrors) -> Self {
        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(errors) => Some(errors),
        }
    }

    /// Messages for one field, empty when the field is valid
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors().and_then(|e| e.get(field)).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_empty_errors_is_valid() {
        assert!(ValidationResult::from_errors(FieldErrors::new()).is_valid());
    }

    #[test]
    fn test_push_keeps_order() {
        let mut errors = FieldErrors::new();
        errors.push("otp", "first");
        errors.push("otp", "second");
        assert_eq!(
            errors.get("otp"),
            Some(&["first".to_string(), "second".to_string()][..])
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_messages_for_valid_field_are_empty() {
        let mut errors = FieldErrors::new();
        errors.push("name", "Name is required");
        let result = ValidationResult::from_errors(errors);
        assert!(!result.is_valid());
        assert!(result.messages("email").is_empty());
        assert_eq!(result.messages("name"), ["Name is required".to_string()]);
    }

    #[test]
    fn test_serialize_shape() {
        let mut errors = FieldErrors::new();
        errors.push("name", "bad");
        let json = serde_json::to_value(ValidationResult::Invalid(errors)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "invalid", "errors": {"name": ["bad"]}})
        );
    }
}
