//! Remote call failures and their normalized, user-facing description

use crate::forms::FormError;
use serde_json::Value;
use thiserror::Error;

/// Shown when the server could not be reached at all
pub const TRANSPORT_FALLBACK: &str = "Unable to reach the server. Please try again.";

/// Shown when a failure carries no readable message
pub const GENERIC_FALLBACK: &str = "Something went wrong. Please try again.";

/// Places a message may hide in an error payload, tried in order
const MESSAGE_POINTERS: [&str; 5] = [
    "/response/body/message",
    "/data/message",
    "/body/message",
    "/message",
    "/error",
];

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, payload: Value },

    /// Any other failure value, shape unknown
    #[error("Unexpected failure: {0}")]
    Raw(Value),

    /// Validated values could not be turned into a request body
    #[error(transparent)]
    InvalidInput(#[from] FormError),
}

impl ApiError {
    pub fn raw(value: impl Into<Value>) -> Self {
        ApiError::Raw(value.into())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::Rejected {
                status: status.as_u16(),
                payload: Value::Null,
            },
            None => ApiError::Transport(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Rejection,
    Unknown,
}

/// What `on_error` hooks receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }
}

impl From<&ApiError> for ErrorInfo {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Transport(_) => ErrorInfo::new(ErrorKind::Transport, TRANSPORT_FALLBACK),
            ApiError::Rejected { status, payload } => ErrorInfo {
                kind: ErrorKind::Rejection,
                status: Some(*status),
                message: extract_message(payload).unwrap_or_else(|| GENERIC_FALLBACK.to_string()),
            },
            ApiError::Raw(payload) => ErrorInfo::new(
                ErrorKind::Unknown,
                extract_message(payload).unwrap_or_else(|| GENERIC_FALLBACK.to_string()),
            ),
            ApiError::InvalidInput(e) => ErrorInfo::new(ErrorKind::Unknown, e.to_string()),
        }
    }
}

/// Find a readable message in an arbitrary error payload
pub fn extract_message(payload: &Value) -> Option<String> {
    MESSAGE_POINTERS
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(non_empty))
        .or_else(|| non_empty(payload))
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_nested_response_body_message() {
        let err = ApiError::raw(json!({"response": {"body": {"message": "X"}}}));
        assert_eq!(ErrorInfo::from(&err).message, "X");
    }

    #[test]
    fn test_plain_string() {
        let err = ApiError::raw("Y");
        let info = ErrorInfo::from(&err);
        assert_eq!(info.message, "Y");
        assert_eq!(info.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_unshaped_object_falls_back() {
        let err = ApiError::raw(json!({"code": 17, "detail": {"x": 1}}));
        let info = ErrorInfo::from(&err);
        assert_eq!(info.message, GENERIC_FALLBACK);
        assert!(!info.message.is_empty());
    }

    #[test]
    fn test_pointer_priority() {
        let payload = json!({"message": "outer", "data": {"message": "inner"}});
        assert_eq!(extract_message(&payload).as_deref(), Some("inner"));
    }

    #[test]
    fn test_blank_message_is_skipped() {
        let payload = json!({"message": "  ", "error": "Forbidden"});
        assert_eq!(extract_message(&payload).as_deref(), Some("Forbidden"));
    }

    #[test]
    fn test_rejection_keeps_status_and_server_message() {
        let err = ApiError::Rejected {
            status: 409,
            payload: json!({"message": "Project already exists"}),
        };
        assert_eq!(
            ErrorInfo::from(&err),
            ErrorInfo {
                kind: ErrorKind::Rejection,
                status: Some(409),
                message: "Project already exists".to_string(),
            }
        );
    }

    #[test]
    fn test_transport_uses_fallback() {
        let err = ApiError::Transport("connection refused".to_string());
        let info = ErrorInfo::from(&err);
        assert_eq!(info.kind, ErrorKind::Transport);
        assert_eq!(info.message, TRANSPORT_FALLBACK);
    }

    #[test]
    fn test_invalid_input_names_field() {
        let err = ApiError::from(FormError::Missing("email".to_string()));
        assert!(ErrorInfo::from(&err).message.contains("email"));
    }
}
