//! The single failure model handed to the UI
//!
//! Every backend error shape is collapsed into one message here so screens
//! only ever have to display [`ApiError`]'s `Display` output.

use biblio_shared::{
    const_config::error::{ERROR_GENERIC_MSG, ERROR_SESSION_EXPIRED_MSG},
    errors::NotLoggedInError,
};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend refused the credentials during login
    #[error("{message}")]
    LoginRejected { message: String },
    /// An authenticated call got a 401, the session has been cleared
    #[error("{message}")]
    Unauthorized { message: String },
    /// Field level errors reported by the backend
    #[error("{message}")]
    Validation { message: String },
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The request could not be sent or no response was received
    #[error("{message}")]
    Transport { message: String },
    /// A success response that could not be used
    #[error("{message}")]
    InvalidResponse { message: String },
    #[error("failed to save the session: {message}")]
    Storage { message: String },
    #[error(transparent)]
    NotLoggedIn(#[from] NotLoggedInError),
}

impl ApiError {
    pub fn transport() -> Self {
        Self::Transport {
            message: ERROR_GENERIC_MSG.to_string(),
        }
    }

    pub fn invalid_response() -> Self {
        Self::InvalidResponse {
            message: ERROR_GENERIC_MSG.to_string(),
        }
    }

    /// Returns `true` if the error is [`Unauthorized`]
    ///
    /// [`Unauthorized`]: ApiError::Unauthorized
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if the error is [`Validation`]
    ///
    /// [`Validation`]: ApiError::Validation
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The status code of the response that caused the error, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds the error for a non-success response from its status and raw body
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        debug_assert!(
            !status.is_success(),
            "this is supposed to be an error, right? Status code is: {status}"
        );
        let normalized = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|payload| normalize_error_payload(&payload));
        match (status, normalized) {
            (StatusCode::UNAUTHORIZED, normalized) => Self::Unauthorized {
                message: normalized
                    .map(NormalizedError::into_message)
                    .unwrap_or_else(|| ERROR_SESSION_EXPIRED_MSG.to_string()),
            },
            (_, Some(NormalizedError::Validation(message))) => Self::Validation { message },
            (status, Some(NormalizedError::Message(message))) => Self::Rejected {
                status: status.as_u16(),
                message,
            },
            (status, None) => Self::Rejected {
                status: status.as_u16(),
                message: ERROR_GENERIC_MSG.to_string(),
            },
        }
    }

    /// Reclassifies errors from the login exchange
    ///
    /// A 401 while logging in means bad credentials, not an expired session
    pub(crate) fn into_login_failure(self) -> Self {
        match self {
            Self::Unauthorized { message } => Self::LoginRejected { message },
            Self::Rejected { status, message } if (400..500).contains(&status) => {
                Self::LoginRejected { message }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedError {
    Message(String),
    Validation(String),
}

impl NormalizedError {
    pub fn into_message(self) -> String {
        match self {
            Self::Message(message) | Self::Validation(message) => message,
        }
    }
}

/// Collapses any backend error payload into a single message
///
/// Returns `None` when nothing usable was found so the caller can pick an
/// appropriate fallback
pub fn normalize_error_payload(payload: &Value) -> Option<NormalizedError> {
    match payload {
        Value::String(message) => non_empty(message).map(NormalizedError::Message),
        Value::Object(fields) => {
            if let Some(detail) = fields.get("detail") {
                if let Some(normalized) = normalize_detail(detail) {
                    return Some(normalized);
                }
            }
            ["message", "error"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str).and_then(non_empty))
                .map(NormalizedError::Message)
        }
        _ => None,
    }
}

/// Convenience for callers that only need the message
pub fn normalize_error_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| normalize_error_payload(&payload))
        .map(NormalizedError::into_message)
        .unwrap_or_else(|| ERROR_GENERIC_MSG.to_string())
}

fn normalize_detail(detail: &Value) -> Option<NormalizedError> {
    match detail {
        Value::String(message) => non_empty(message).map(NormalizedError::Message),
        Value::Array(items) => validation_message(items).map(NormalizedError::Validation),
        Value::Object(fields) => {
            let message = ["msg", "message"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str).and_then(non_empty))
                .unwrap_or_else(|| detail.to_string());
            Some(NormalizedError::Message(message))
        }
        Value::Null => None,
        other => Some(NormalizedError::Message(other.to_string())),
    }
}

/// Joins entries like `{"loc": ["body", "email"], "msg": "field required"}`
/// into `body.email: field required`
fn validation_message(items: &[Value]) -> Option<String> {
    let parts: Vec<String> = items
        .iter()
        .filter_map(|item| {
            let msg = item
                .get("msg")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| item.to_string());
            let location = item
                .get("loc")
                .and_then(Value::as_array)
                .map(|loc| {
                    loc.iter()
                        .map(|segment| match segment {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .filter(|location| !location.is_empty());
            let part = match location {
                Some(location) => format!("{location}: {msg}"),
                None => msg,
            };
            non_empty(&part)
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
