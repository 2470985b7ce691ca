//! Form field value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Number(i64),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Get the text value (returns empty string for non-text values)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// Get the list value (returns an empty slice for non-list values)
    pub fn as_list(&self) -> &[String] {
        match self {
            FieldValue::List(items) => items,
            _ => &[],
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::List(_) => None,
        }
    }

    /// Whitespace-only text and empty lists count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match self {
            FieldValue::Text(s) => s.push(c),
            FieldValue::Number(n) => {
                if let Some(d) = c.to_digit(10) {
                    *n = n.saturating_mul(10).saturating_add(i64::from(d));
                }
            }
            FieldValue::List(_) => {
                // Lists are edited through toggle_item
            }
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        match self {
            FieldValue::Text(s) => {
                s.pop();
            }
            FieldValue::Number(n) => *n /= 10,
            FieldValue::List(_) => {}
        }
    }

    /// Add the item if missing, remove it otherwise
    pub fn toggle_item(&mut self, item: &str) {
        if !matches!(self, FieldValue::List(_)) {
            *self = FieldValue::List(Vec::new());
        }
        if let FieldValue::List(items) = self {
            if let Some(pos) = items.iter().position(|i| i == item) {
                items.remove(pos);
            } else {
                items.push(item.to_string());
            }
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match self {
            FieldValue::Text(s) => s.clear(),
            FieldValue::List(items) => items.clear(),
            FieldValue::Number(n) => *n = 0,
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

/// Accumulated values of a form, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.0.get_mut(name)
    }

    /// Mutable access, inserting an empty text value first if absent
    pub fn entry(&mut self, name: &str) -> &mut FieldValue {
        self.0.entry(name.to_string()).or_default()
    }

    /// Text of a field, empty when absent
    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    /// Trimmed text of a field, `None` when absent or blank
    pub fn optional_text(&self, name: &str) -> Option<String> {
        let text = self.text(name).trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn list(&self, name: &str) -> &[String] {
        self.get(name).map(FieldValue::as_list).unwrap_or(&[])
    }

    pub fn number(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_number)
    }

    /// Present means the key exists and the value is not blank
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_blank())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod field_value {
        use super::*;

        #[test]
        fn test_default_is_empty_text() {
            assert_eq!(FieldValue::default(), FieldValue::Text(String::new()));
        }

        #[test]
        fn test_blank_detection() {
            assert!(FieldValue::from("   ").is_blank());
            assert!(FieldValue::List(vec![]).is_blank());
            assert!(!FieldValue::from("x").is_blank());
            assert!(!FieldValue::Number(0).is_blank());
        }

        #[test]
        fn test_push_and_pop_text() {
            let mut value = FieldValue::default();
            value.push_char('a');
            value.push_char('b');
            assert_eq!(value.as_text(), "ab");
            value.pop_char();
            assert_eq!(value.as_text(), "a");
        }

        #[test]
        fn test_push_digits_into_number() {
            let mut value = FieldValue::Number(0);
            value.push_char('4');
            value.push_char('2');
            value.push_char('x');
            assert_eq!(value.as_number(), Some(42));
            value.pop_char();
            assert_eq!(value.as_number(), Some(4));
        }

        #[test]
        fn test_toggle_item_adds_then_removes() {
            let mut value = FieldValue::List(vec![]);
            value.toggle_item("p1");
            value.toggle_item("p2");
            assert_eq!(value.as_list(), ["p1".to_string(), "p2".to_string()]);
            value.toggle_item("p1");
            assert_eq!(value.as_list(), ["p2".to_string()]);
        }

        #[test]
        fn test_toggle_item_converts_text() {
            let mut value = FieldValue::from("");
            value.toggle_item("p1");
            assert_eq!(value.as_list(), ["p1".to_string()]);
        }

        #[test]
        fn test_text_number_parses() {
            assert_eq!(FieldValue::from(" 75 ").as_number(), Some(75));
            assert_eq!(FieldValue::from("abc").as_number(), None);
        }

        #[test]
        fn test_display_value() {
            assert_eq!(FieldValue::from(vec!["a", "b"]).display_value(), "a, b");
            assert_eq!(FieldValue::Number(7).display_value(), "7");
        }
    }

    mod form_values {
        use super::*;

        #[test]
        fn test_with_and_accessors() {
            let values = FormValues::new()
                .with("name", "Ann")
                .with("projects", vec!["p1"])
                .with("progress", 50i64);
            assert_eq!(values.text("name"), "Ann");
            assert_eq!(values.list("projects"), ["p1".to_string()]);
            assert_eq!(values.number("progress"), Some(50));
            assert_eq!(values.text("missing"), "");
            assert!(values.list("missing").is_empty());
        }

        #[test]
        fn test_is_present() {
            let values = FormValues::new().with("a", "  ").with("b", "x");
            assert!(!values.is_present("a"));
            assert!(values.is_present("b"));
            assert!(!values.is_present("c"));
        }

        #[test]
        fn test_optional_text_trims() {
            let values = FormValues::new().with("module", "  auth ").with("assignee", " ");
            assert_eq!(values.optional_text("module"), Some("auth".to_string()));
            assert_eq!(values.optional_text("assignee"), None);
        }

        #[test]
        fn test_entry_inserts_default() {
            let mut values = FormValues::new();
            values.entry("name").push_char('A');
            assert_eq!(values.text("name"), "A");
        }

        #[test]
        fn test_serialization_is_plain_json() {
            let values = FormValues::new().with("name", "Ann").with("projects", vec!["p1"]);
            let json = serde_json::to_value(&values).unwrap();
            assert_eq!(json, serde_json::json!({"name": "Ann", "projects": ["p1"]}));
        }
    }
}
