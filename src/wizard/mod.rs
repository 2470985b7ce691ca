//! Multi-step form sessions

mod state;
mod step;

pub use state::{SubmitBlocked, SubmitOutcome, Wizard, WizardPhase};
pub use step::{Focus, FormStep};
