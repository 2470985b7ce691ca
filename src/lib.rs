//! Taskdeck client core: form validation, multi-step wizards, API call
//! orchestration and post-mutation refetching.

pub mod alerts;
pub mod api;
pub mod config;
pub mod flows;
pub mod forms;
pub mod refetch;
pub mod session;
pub mod wizard;
