//! Declarative form schemas and the validation entry points

use super::result::{FieldErrors, ValidationResult};
use super::rule::{parse_day, Rule};
use super::value::{FieldValue, FormValues};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

/// Schema mis-definitions, surfaced when the schema is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("form `{0}` declares no fields")]
    Empty(String),

    #[error("form `{form}` declares field `{field}` twice")]
    DuplicateField { form: String, field: String },

    #[error("form `{form}`: cross-field rule references undeclared field `{field}`")]
    UnknownField { form: String, field: String },

    #[error("field `{field}` has an invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("form `{form}`: step {step} is invalid: {reason}")]
    InvalidStep {
        form: String,
        step: usize,
        reason: String,
    },
}

/// How a field is presented and edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Secret,
    Multiline,
    Date,
    Choice(Vec<String>),
    MultiSelect,
    Number,
}

/// One field's rule set
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub rules: Vec<Rule>,
    default: Option<FieldValue>,
}

impl FieldSchema {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            rules: Vec::new(),
            default: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn secret(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Secret)
    }

    pub fn multiline(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Multiline)
    }

    pub fn date(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn number(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn multi_select(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::MultiSelect)
    }

    /// A choice field; its options double as a membership rule
    pub fn choice(name: &str, label: &str, options: &[&str], message: &str) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        let mut field = Self::new(name, label, FieldKind::Choice(options.clone()));
        field.rules.push(Rule::OneOf {
            options,
            message: message.to_string(),
        });
        field
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self, message: &str) -> Self {
        self.rule(Rule::Required {
            message: message.to_string(),
        })
    }

    pub fn min_length(self, min: usize, message: &str) -> Self {
        self.rule(Rule::MinLength {
            min,
            message: message.to_string(),
        })
    }

    pub fn max_length(self, max: usize, message: &str) -> Self {
        self.rule(Rule::MaxLength {
            max,
            message: message.to_string(),
        })
    }

    pub fn email(self, message: &str) -> Self {
        self.rule(Rule::Email {
            message: message.to_string(),
        })
    }

    pub fn valid_date(self, message: &str) -> Self {
        self.rule(Rule::Date {
            message: message.to_string(),
        })
    }

    pub fn not_in_past(self, message: &str) -> Self {
        self.rule(Rule::NotInPast {
            message: message.to_string(),
        })
    }

    pub fn min_items(self, min: usize, message: &str) -> Self {
        self.rule(Rule::MinItems {
            min,
            message: message.to_string(),
        })
    }

    pub fn range(self, min: i64, max: i64, message: &str) -> Self {
        self.rule(Rule::Range {
            min,
            max,
            message: message.to_string(),
        })
    }

    pub fn pattern(self, pattern: &str, message: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            field: self.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(self.rule(Rule::Pattern {
            regex,
            message: message.to_string(),
        }))
    }

    /// Value a fresh form starts with
    pub fn initial_value(&self) -> FieldValue {
        if let Some(value) = &self.default {
            return value.clone();
        }
        match self.kind {
            FieldKind::MultiSelect => FieldValue::List(Vec::new()),
            FieldKind::Number => FieldValue::Number(0),
            _ => FieldValue::default(),
        }
    }

    fn is_required(&self) -> bool {
        self.rules.iter().any(Rule::is_required)
    }

    fn check(&self, value: Option<&FieldValue>, today: NaiveDate, errors: &mut FieldErrors) -> bool {
        let present = value.filter(|v| !v.is_blank());
        let Some(value) = present else {
            if let Some(required) = self.rules.iter().find(|r| r.is_required()) {
                errors.push(&self.name, required.message());
                return false;
            }
            // Blank optional values count as not provided
            return true;
        };

        let mut ok = true;
        for rule in self.rules.iter().filter(|r| !r.is_required()) {
            if !rule.passes(value, today) {
                errors.push(&self.name, rule.message());
                ok = false;
            }
        }
        ok
    }
}

/// A rule spanning two fields, reported on `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossFieldRule {
    /// `end` must be a later day than `start`
    DateOrder {
        start: String,
        end: String,
        path: String,
        message: String,
    },
    /// `field` must equal `other`
    Matches {
        field: String,
        other: String,
        path: String,
        message: String,
    },
}

impl CrossFieldRule {
    pub fn date_order(start: &str, end: &str, message: &str) -> Self {
        CrossFieldRule::DateOrder {
            start: start.to_string(),
            end: end.to_string(),
            path: end.to_string(),
            message: message.to_string(),
        }
    }

    pub fn matches(field: &str, other: &str, message: &str) -> Self {
        CrossFieldRule::Matches {
            field: field.to_string(),
            other: other.to_string(),
            path: other.to_string(),
            message: message.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            CrossFieldRule::DateOrder { path, .. } | CrossFieldRule::Matches { path, .. } => path,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CrossFieldRule::DateOrder { message, .. } | CrossFieldRule::Matches { message, .. } => {
                message
            }
        }
    }

    /// Every field the rule reads or reports on
    pub fn fields(&self) -> [&str; 3] {
        match self {
            CrossFieldRule::DateOrder {
                start, end, path, ..
            } => [start.as_str(), end.as_str(), path.as_str()],
            CrossFieldRule::Matches {
                field, other, path, ..
            } => [field.as_str(), other.as_str(), path.as_str()],
        }
    }

    fn inputs(&self) -> [&str; 2] {
        match self {
            CrossFieldRule::DateOrder { start, end, .. } => [start.as_str(), end.as_str()],
            CrossFieldRule::Matches { field, other, .. } => [field.as_str(), other.as_str()],
        }
    }

    fn holds(&self, values: &FormValues) -> bool {
        match self {
            CrossFieldRule::DateOrder { start, end, .. } => {
                match (parse_day(values.text(start)), parse_day(values.text(end))) {
                    (Some(start), Some(end)) => end > start,
                    // Format errors belong to the per-field rules
                    _ => true,
                }
            }
            CrossFieldRule::Matches { field, other, .. } => values.get(field) == values.get(other),
        }
    }
}

/// A full form schema: fields in declaration order plus cross-field rules
#[derive(Debug, Clone)]
pub struct FormSchema {
    name: String,
    fields: Vec<FieldSchema>,
    cross_rules: Vec<CrossFieldRule>,
}

impl FormSchema {
    pub fn builder(name: &str) -> FormSchemaBuilder {
        FormSchemaBuilder {
            name: name.to_string(),
            fields: Vec::new(),
            cross_rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn cross_rules(&self) -> &[CrossFieldRule] {
        &self.cross_rules
    }

    /// Initial values for every declared field
    pub fn default_values(&self) -> FormValues {
        let mut values = FormValues::new();
        for field in &self.fields {
            values.set(&field.name, field.initial_value());
        }
        values
    }

    /// Validate the whole schema against today's date
    pub fn validate(&self, values: &FormValues) -> ValidationResult {
        self.validate_on(values, Local::now().date_naive())
    }

    /// Validate the whole schema with an explicit "today"
    pub fn validate_on(&self, values: &FormValues, today: NaiveDate) -> ValidationResult {
        self.validate_scoped(values, |_| true, today)
    }

    /// Validate only the named fields and the cross-field rules they fully cover.
    ///
    /// Names not declared by the schema are ignored.
    pub fn validate_fields(
        &self,
        values: &FormValues,
        fields: &[String],
        today: NaiveDate,
    ) -> ValidationResult {
        self.validate_scoped(values, |name| fields.iter().any(|f| f == name), today)
    }

    fn validate_scoped(
        &self,
        values: &FormValues,
        in_scope: impl Fn(&str) -> bool,
        today: NaiveDate,
    ) -> ValidationResult {
        let mut errors = FieldErrors::new();
        let mut missing_required: HashSet<&str> = HashSet::new();

        for field in self.fields.iter().filter(|f| in_scope(&f.name)) {
            let value = values.get(&field.name);
            if !field.check(value, today, &mut errors)
                && field.is_required()
                && !values.is_present(&field.name)
            {
                missing_required.insert(&field.name);
            }
        }

        for rule in &self.cross_rules {
            if !rule.fields().iter().all(|f| in_scope(f)) {
                continue;
            }
            if !rule.inputs().iter().all(|f| values.is_present(f)) {
                continue;
            }
            if missing_required.contains(rule.path()) {
                continue;
            }
            if !rule.holds(values) {
                errors.push(rule.path(), rule.message());
            }
        }

        ValidationResult::from_errors(errors)
    }
}

/// Builder that checks the schema for mis-definitions
#[derive(Debug)]
pub struct FormSchemaBuilder {
    name: String,
    fields: Vec<FieldSchema>,
    cross_rules: Vec<CrossFieldRule>,
}

impl FormSchemaBuilder {
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn cross(mut self, rule: CrossFieldRule) -> Self {
        self.cross_rules.push(rule);
        self
    }

    pub fn build(self) -> Result<FormSchema, SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty(self.name));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    form: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        for rule in &self.cross_rules {
            if let Some(unknown) = rule.fields().iter().find(|f| !seen.contains(*f)) {
                return Err(SchemaError::UnknownField {
                    form: self.name.clone(),
                    field: unknown.to_string(),
                });
            }
        }

        Ok(FormSchema {
            name: self.name,
            fields: self.fields,
            cross_rules: self.cross_rules,
        })
    }
}
