//! Remote API access: client, wire models and call orchestration

pub mod client;
mod error;
pub mod models;
mod orchestrator;

pub use client::{ApiClientTrait, HttpApiClient};
#[cfg(test)]
pub use client::MockApiClientTrait;
pub use error::{extract_message, ApiError, ErrorInfo, ErrorKind, GENERIC_FALLBACK, TRANSPORT_FALLBACK};
pub use orchestrator::{make_api_call, CallHooks, Outcome};
