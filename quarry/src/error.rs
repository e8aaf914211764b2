//! Error types for request building and execution

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Errors raised while composing, executing or reshaping a search
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid {kind} value: {value:?}")]
    InvalidEnumValue { kind: &'static str, value: String },

    #[error("Empty search query")]
    EmptyQuery,

    #[error("Result is empty")]
    EmptyResult,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Backend error: {0}")]
    Backend(BackendError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnumValue {
            kind,
            value: value.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Root cause type of a backend failure, if this is one
    pub fn root_cause_type(&self) -> Option<&str> {
        match self {
            Self::Backend(err) => err.root_cause_type(),
            _ => None,
        }
    }

    /// HTTP-like status reported by the backend, if this is a backend failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend(err) => err.status,
            _ => None,
        }
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}

/// A failure reported by the search backend, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(rename = "type")]
    pub error_type: String,
    pub reason: String,
    #[serde(default)]
    pub root_cause: Vec<RootCause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    #[serde(rename = "type")]
    pub error_type: String,
    pub reason: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
    #[serde(default)]
    status: Option<u16>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Object {
        #[serde(rename = "type")]
        error_type: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        root_cause: Vec<RootCause>,
    },
    Text(String),
}

impl BackendError {
    pub fn new(status: Option<u16>, error_type: impl Into<String>, reason: impl Into<String>) -> Self {
        let error_type = error_type.into();
        let reason = reason.into();
        Self {
            status,
            root_cause: vec![RootCause {
                error_type: error_type.clone(),
                reason: reason.clone(),
            }],
            error_type,
            reason,
        }
    }

    /// Parse the engine's `{"error": {...}, "status": n}` envelope.
    ///
    /// Bodies that don't follow the envelope are kept as the reason text so
    /// nothing the backend said is lost.
    pub fn from_body(status: Option<u16>, body: &Value) -> Self {
        match serde_json::from_value::<ErrorEnvelope>(body.clone()) {
            Ok(ErrorEnvelope {
                error:
                    ErrorDetail::Object {
                        error_type,
                        reason,
                        root_cause,
                    },
                status: body_status,
            }) => Self {
                status: status.or(body_status),
                reason: reason.unwrap_or_default(),
                error_type,
                root_cause,
            },
            Ok(ErrorEnvelope {
                error: ErrorDetail::Text(reason),
                status: body_status,
            }) => Self {
                status: status.or(body_status),
                error_type: "unknown".to_string(),
                reason,
                root_cause: Vec::new(),
            },
            Err(_) => Self {
                status,
                error_type: "unknown".to_string(),
                reason: body.to_string(),
                root_cause: Vec::new(),
            },
        }
    }

    /// First root cause type, falling back to the top-level type
    pub fn root_cause_type(&self) -> Option<&str> {
        self.root_cause
            .first()
            .map(|cause| cause.error_type.as_str())
            .or(Some(self.error_type.as_str()))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {}: {}", status, self.error_type, self.reason),
            None => write!(f, "{}: {}", self.error_type, self.reason),
        }
    }
}
