//! Lifecycle wrapper around a single remote call

use super::error::{ApiError, ErrorInfo};
use std::future::Future;
use tracing::{debug, warn};

type SuccessHook<'a, T> = Box<dyn FnOnce(&T) + Send + 'a>;
type ErrorHook<'a> = Box<dyn FnOnce(&ErrorInfo) + Send + 'a>;
type NotifyHook<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Optional callbacks fired around a call
pub struct CallHooks<'a, T> {
    on_success: Option<SuccessHook<'a, T>>,
    on_error: Option<ErrorHook<'a>>,
    on_notify: Option<NotifyHook<'a>>,
}

impl<'a, T> CallHooks<'a, T> {
    pub fn new() -> Self {
        Self {
            on_success: None,
            on_error: None,
            on_notify: None,
        }
    }

    pub fn on_success(mut self, hook: impl FnOnce(&T) + Send + 'a) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl FnOnce(&ErrorInfo) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn on_notify(mut self, hook: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_notify = Some(Box::new(hook));
        self
    }

    fn notify(&mut self, message: &str) {
        if let Some(hook) = self.on_notify.as_mut() {
            hook(message);
        }
    }
}

impl<T> Default for CallHooks<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal result of one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Succeeded(T),
    Failed(ErrorInfo),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Outcome::Succeeded(_) => None,
            Outcome::Failed(info) => Some(info),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Succeeded(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }
}

/// Run `operation` once and route its result to exactly one of the hooks.
///
/// Never retries and never returns an error; failures come back as
/// `Outcome::Failed` after `on_error` has run.
pub async fn make_api_call<'a, T, F, Fut>(operation: F, mut hooks: CallHooks<'a, T>) -> Outcome<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    debug!("Dispatching API call");
    hooks.notify("Request sent");

    match operation().await {
        Ok(value) => {
            debug!("API call succeeded");
            hooks.notify("Request completed");
            if let Some(hook) = hooks.on_success.take() {
                hook(&value);
            }
            Outcome::Succeeded(value)
        }
        Err(err) => {
            let info = ErrorInfo::from(&err);
            warn!(kind = ?info.kind, status = ?info.status, error = %err, "API call failed");
            hooks.notify("Request failed");
            if let Some(hook) = hooks.on_error.take() {
                hook(&info);
            }
            Outcome::Failed(info)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{ErrorKind, GENERIC_FALLBACK};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_success_fires_on_success_once() {
        let successes = AtomicUsize::new(0);
        let errors = AtomicUsize::new(0);
        let calls = AtomicUsize::new(0);

        let outcome = make_api_call(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ApiError>(42)
            },
            CallHooks::new()
                .on_success(|v: &i32| {
                    assert_eq!(*v, 42);
                    successes.fetch_add(1, Ordering::SeqCst);
                })
                .on_error(|_| {
                    errors.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .await;

        assert_eq!(outcome, Outcome::Succeeded(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejection_fires_on_error_with_message() {
        let mut seen = Vec::new();
        let outcome = make_api_call(
            || async {
                Err::<(), _>(ApiError::raw(json!({"response": {"body": {"message": "X"}}})))
            },
            CallHooks::new()
                .on_success(|_| panic!("success hook must not run"))
                .on_error(|info| seen.push(info.message.clone())),
        )
        .await;

        assert_eq!(seen, vec!["X".to_string()]);
        assert_eq!(outcome.error().map(|e| e.message.as_str()), Some("X"));
    }

    #[tokio::test]
    async fn test_unshaped_failure_gets_fallback() {
        let outcome = make_api_call(
            || async { Err::<(), _>(ApiError::raw(json!([1, 2, 3]))) },
            CallHooks::new(),
        )
        .await;

        let info = outcome.error().cloned();
        assert_eq!(
            info,
            Some(ErrorInfo::new(ErrorKind::Unknown, GENERIC_FALLBACK))
        );
    }

    #[tokio::test]
    async fn test_notify_sees_lifecycle() {
        let mut notes = Vec::new();
        make_api_call(
            || async { Ok::<_, ApiError>(()) },
            CallHooks::new().on_notify(|m| notes.push(m.to_string())),
        )
        .await;

        assert_eq!(notes, vec!["Request sent", "Request completed"]);
    }

    #[test]
    fn test_hooks_are_optional() {
        let outcome = tokio_test::block_on(make_api_call(
            || async { Err::<u8, _>(ApiError::Transport("reset".to_string())) },
            CallHooks::default(),
        ));
        assert!(!outcome.is_success());
        assert_eq!(outcome.into_value(), None);
    }
}
