//! Wizard state machine

use super::step::{check_steps, Focus, FormStep};
use crate::api::{make_api_call, ApiError, CallHooks, ErrorInfo, Outcome};
use crate::forms::{
    project, DisplayErrors, FieldKind, FieldSchema, FieldValue, FormSchema, FormValues,
    SchemaError,
};
use chrono::{Local, NaiveDate};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Where a wizard session stands. Step numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Step(usize),
    Submitting,
    Completed,
    Closed,
}

/// Why `begin_submit` refused to start a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// Not on the last step, or not on a step at all
    Unavailable,
    /// Local validation failed; errors are displayed
    Invalid,
}

/// Result of a full `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    Blocked(SubmitBlocked),
    Completed(T),
    Failed(ErrorInfo),
}

impl<T> SubmitOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmitOutcome::Completed(_))
    }
}

/// One multi-step form session
#[derive(Debug, Clone)]
pub struct Wizard {
    schema: Arc<FormSchema>,
    steps: Vec<FormStep>,
    initial: FormValues,
    values: FormValues,
    errors: DisplayErrors,
    submit_error: Option<ErrorInfo>,
    phase: WizardPhase,
    active_field_index: usize,
    today: Option<NaiveDate>,
}

impl Wizard {
    pub fn new(schema: impl Into<Arc<FormSchema>>, steps: Vec<FormStep>) -> Result<Self, SchemaError> {
        let schema = schema.into();
        check_steps(&schema, &steps)?;
        let initial = schema.default_values();
        Ok(Self {
            schema,
            steps,
            values: initial.clone(),
            initial,
            errors: DisplayErrors::new(),
            submit_error: None,
            phase: WizardPhase::Step(1),
            active_field_index: 0,
            today: None,
        })
    }

    /// A one-page form over the whole schema
    pub fn single_step(schema: impl Into<Arc<FormSchema>>) -> Self {
        let schema = schema.into();
        let step = FormStep::whole(&schema);
        let initial = schema.default_values();
        Self {
            schema,
            steps: vec![step],
            values: initial.clone(),
            initial,
            errors: DisplayErrors::new(),
            submit_error: None,
            phase: WizardPhase::Step(1),
            active_field_index: 0,
            today: None,
        }
    }

    /// Pre-fill values, e.g. for edit forms; they also become the reset state
    pub fn with_initial(mut self, values: FormValues) -> Self {
        for (name, value) in values.iter() {
            if self.schema.contains(name) {
                self.initial.set(name, value.clone());
            }
        }
        self.values = self.initial.clone();
        self
    }

    /// Pin the date "not in the past" rules compare against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn steps(&self) -> &[FormStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Current step number, `None` outside of the step states
    pub fn step_number(&self) -> Option<usize> {
        match self.phase {
            WizardPhase::Step(i) => Some(i),
            _ => None,
        }
    }

    pub fn current_step(&self) -> Option<&FormStep> {
        self.step_number().and_then(|i| self.steps.get(i - 1))
    }

    /// Schemas of the fields on the visible step
    pub fn current_fields(&self) -> Vec<&FieldSchema> {
        self.current_step()
            .map(|step| {
                step.fields
                    .iter()
                    .filter_map(|name| self.schema.field(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_first_step(&self) -> bool {
        self.step_number() == Some(1)
    }

    pub fn is_last_step(&self) -> bool {
        self.step_number() == Some(self.steps.len())
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == WizardPhase::Submitting
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &DisplayErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    /// Failure of the last submission, if it failed
    pub fn submit_error(&self) -> Option<&ErrorInfo> {
        self.submit_error.as_ref()
    }

    /// Show a server-reported message under a field
    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field, message);
    }

    /// Advance when the visible step validates; returns whether it moved
    pub fn next(&mut self) -> bool {
        let Some(i) = self.step_number() else {
            return false;
        };
        if i >= self.steps.len() {
            return false;
        }

        let fields = self.steps[i - 1].fields.clone();
        let result = self.schema.validate_fields(&self.values, &fields, self.today());
        if !result.is_valid() {
            debug!(form = self.schema.name(), step = i, "Step did not validate");
            self.errors = project(&result);
            return false;
        }

        self.errors.clear();
        self.phase = WizardPhase::Step(i + 1);
        self.active_field_index = 0;
        true
    }

    /// Go back a step without validating the one being left
    pub fn back(&mut self) -> bool {
        match self.phase {
            WizardPhase::Step(i) if i > 1 => {
                self.errors.clear();
                self.phase = WizardPhase::Step(i - 1);
                self.active_field_index = 0;
                true
            }
            _ => false,
        }
    }

    /// Set a field value and clear only that field's error.
    ///
    /// Ignored outside the step states and for undeclared fields.
    pub fn update_field(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        if !self.accepts_edit(name) {
            return false;
        }
        self.values.set(name, value);
        self.errors.clear_field(name);
        true
    }

    fn accepts_edit(&self, name: &str) -> bool {
        matches!(self.phase, WizardPhase::Step(_)) && self.schema.contains(name)
    }

    pub fn focused_field(&self) -> Option<&FieldSchema> {
        self.current_step()
            .and_then(|step| step.fields.get(self.active_field_index))
            .and_then(|name| self.schema.field(name))
    }

    /// Edit the focused value in place, clearing its error
    pub fn edit_focused(&mut self, edit: impl FnOnce(&mut FieldValue)) -> bool {
        let Some(name) = self.focused_field().map(|f| f.name.clone()) else {
            return false;
        };
        if !self.accepts_edit(&name) {
            return false;
        }
        edit(self.values.entry(&name));
        self.errors.clear_field(&name);
        true
    }

    /// Move a choice field to its next or previous option
    pub fn cycle_focused_choice(&mut self, forward: bool) -> bool {
        let options = match self.focused_field().map(|f| &f.kind) {
            Some(FieldKind::Choice(options)) if !options.is_empty() => options.clone(),
            _ => return false,
        };
        self.edit_focused(|value| {
            let current = options.iter().position(|o| o == value.as_text());
            let next = match (current, forward) {
                (Some(i), true) => (i + 1) % options.len(),
                (Some(0), false) | (None, false) => options.len() - 1,
                (Some(i), false) => i - 1,
                (None, true) => 0,
            };
            *value = FieldValue::Text(options[next].clone());
        })
    }

    /// Validate everything and enter `Submitting`, handing out the values
    pub fn begin_submit(&mut self) -> Result<FormValues, SubmitBlocked> {
        if !self.is_last_step() {
            return Err(SubmitBlocked::Unavailable);
        }

        let result = self.schema.validate_on(&self.values, self.today());
        if let Some(errors) = result.errors() {
            // Jump to the first step showing an invalid field
            if let Some(index) = self
                .steps
                .iter()
                .position(|s| s.fields.iter().any(|f| errors.contains(f)))
            {
                if self.phase != WizardPhase::Step(index + 1) {
                    self.phase = WizardPhase::Step(index + 1);
                    self.active_field_index = 0;
                }
            }
            self.errors = project(&result);
            return Err(SubmitBlocked::Invalid);
        }

        self.errors.clear();
        self.submit_error = None;
        self.phase = WizardPhase::Submitting;
        Ok(self.values.clone())
    }

    /// Apply the remote outcome of a submission started with `begin_submit`
    pub fn finish_submit<T>(&mut self, outcome: &Outcome<T>) {
        if self.phase != WizardPhase::Submitting {
            return;
        }
        match outcome {
            Outcome::Succeeded(_) => {
                self.phase = WizardPhase::Completed;
            }
            Outcome::Failed(info) => {
                self.submit_error = Some(info.clone());
                self.phase = WizardPhase::Step(self.steps.len());
            }
        }
    }

    /// Validate, run `operation` through the orchestrator and settle the phase
    pub async fn submit<'a, T, F, Fut>(
        &mut self,
        hooks: CallHooks<'a, T>,
        operation: F,
    ) -> SubmitOutcome<T>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let values = match self.begin_submit() {
            Ok(values) => values,
            Err(blocked) => return SubmitOutcome::Blocked(blocked),
        };

        let outcome = make_api_call(move || operation(values), hooks).await;
        self.finish_submit(&outcome);
        match outcome {
            Outcome::Succeeded(value) => SubmitOutcome::Completed(value),
            Outcome::Failed(info) => SubmitOutcome::Failed(info),
        }
    }

    /// Back to step 1 with the initial values
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.submit_error = None;
        self.phase = WizardPhase::Step(1);
        self.active_field_index = 0;
    }

    /// Cancel the session, discarding everything entered
    pub fn close(&mut self) {
        self.reset();
        self.phase = WizardPhase::Closed;
    }
}

impl Focus for Wizard {
    fn field_count(&self) -> usize {
        self.current_step().map_or(0, |step| step.fields.len())
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.field_count().saturating_sub(1));
    }
}
