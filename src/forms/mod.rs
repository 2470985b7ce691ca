//! Declarative form schemas and their validation

pub mod catalog;
mod projection;
mod result;
mod rule;
mod schema;
mod value;

pub use projection::{project, DisplayErrors};
pub use result::{FieldErrors, ValidationResult};
pub use rule::{parse_day, Rule};
pub use schema::{CrossFieldRule, FieldKind, FieldSchema, FormSchema, FormSchemaBuilder, SchemaError};
pub use value::{FieldValue, FormValues};

use thiserror::Error;

/// Failure to turn validated values into a request body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Missing value for field: {0}")]
    Missing(String),

    #[error("Invalid value for field {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl FormError {
    pub fn field(&self) -> &str {
        match self {
            FormError::Missing(field) => field,
            FormError::Invalid { field, .. } => field,
        }
    }
}
