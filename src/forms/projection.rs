//! Projection of validation results onto per-field display messages

use super::result::ValidationResult;
use std::collections::BTreeMap;

/// One display message per field with errors.
///
/// Fields without errors are absent, so error state is tested by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayErrors(BTreeMap<String, String>);

impl DisplayErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a message for a field, e.g. one reported by the server
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    /// Drop the message of a single field, leaving the others
    pub fn clear_field(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Keep the first message of every invalid field
pub fn project(result: &ValidationResult) -> DisplayErrors {
    let mut display = DisplayErrors::new();
    if let Some(errors) = result.errors() {
        for (field, messages) in errors.iter() {
            if let Some(first) = messages.first() {
                display.insert(field, first.clone());
            }
        }
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FieldErrors;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_projects_to_empty() {
        assert!(project(&ValidationResult::Valid).is_empty());
    }

    #[test]
    fn test_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("otp", "OTP must contain only numbers");
        errors.push("otp", "OTP must be 6 digits");
        errors.push("email", "Invalid email address");
        let display = project(&ValidationResult::Invalid(errors));

        assert_eq!(display.len(), 2);
        assert_eq!(display.get("otp"), Some("OTP must contain only numbers"));
        assert_eq!(display.get("email"), Some("Invalid email address"));
        assert!(!display.contains("name"));
    }

    #[test]
    fn test_clear_field_leaves_others() {
        let mut display = DisplayErrors::new();
        display.insert("name", "a");
        display.insert("email", "b");
        display.clear_field("name");
        assert!(!display.contains("name"));
        assert_eq!(display.get("email"), Some("b"));
    }
}
