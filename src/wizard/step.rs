//! Step definitions and focus handling

use crate::forms::{FormSchema, SchemaError};

/// The fields shown together on one wizard page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStep {
    pub title: String,
    pub fields: Vec<String>,
}

impl FormStep {
    pub fn new(title: &str, fields: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// A single step holding every field of the schema
    pub fn whole(schema: &FormSchema) -> Self {
        Self {
            title: schema.name().to_string(),
            fields: schema.field_names(),
        }
    }
}

/// Reject steps that are empty or name fields the schema lacks
pub(crate) fn check_steps(schema: &FormSchema, steps: &[FormStep]) -> Result<(), SchemaError> {
    if steps.is_empty() {
        return Err(SchemaError::InvalidStep {
            form: schema.name().to_string(),
            step: 0,
            reason: "a wizard needs at least one step".to_string(),
        });
    }
    for (index, step) in steps.iter().enumerate() {
        if step.fields.is_empty() {
            return Err(SchemaError::InvalidStep {
                form: schema.name().to_string(),
                step: index + 1,
                reason: "step has no fields".to_string(),
            });
        }
        if let Some(unknown) = step.fields.iter().find(|f| !schema.contains(f)) {
            return Err(SchemaError::InvalidStep {
                form: schema.name().to_string(),
                step: index + 1,
                reason: format!("unknown field {unknown}"),
            });
        }
    }
    Ok(())
}

/// Focus cycling over the fields of the visible step
pub trait Focus {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
}
