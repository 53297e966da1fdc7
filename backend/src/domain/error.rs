//! The single error type services return.
//!
//! [`Error`] knows nothing about HTTP: it carries a category ([`ErrorCode`]),
//! a human-readable message, the trace id of the request that produced it and
//! optional structured `details`. The HTTP adapter decides status codes and
//! redaction.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Failure category. Serialised in snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Validation failed; `details` usually names the field.
    InvalidRequest,
    /// No signed-in user, or the identity token was rejected.
    Unauthorized,
    /// Signed in but lacking the project role the action needs.
    Forbidden,
    NotFound,
    /// The write clashes with current state (taken handle, selected place).
    Conflict,
    InternalError,
}

impl ErrorCode {
    /// Wire spelling, as used in error bodies.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InternalError => "internal_error",
        }
    }

    const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "the request is invalid",
            Self::Unauthorized => "sign-in required",
            Self::Forbidden => "not allowed",
            Self::NotFound => "no such resource",
            Self::Conflict => "the request conflicts with current state",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-agnostic failure.
///
/// The message is never blank: [`Error::new`] substitutes a per-code default
/// and decoding a blank message fails.
///
/// # Examples
/// ```
/// use tripboard::domain::{Error, ErrorCode};
/// use serde_json::json;
///
/// let err = Error::conflict("place is already selected")
///     .with_details(json!({ "placeIds": ["ChIJ51cu8IcbXWARiRtXIothAS4"] }));
/// assert_eq!(err.code(), ErrorCode::Conflict);
/// assert_eq!(err.to_string(), "conflict: place is already selected");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireError", into = "WireError")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Rejection from [`Error::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    #[error("error message must not be blank")]
    EmptyMessage,
}

macro_rules! code_constructors {
    ($($name:ident => $code:ident),* $(,)?) => {
        $(
            #[doc = concat!("Shorthand for [`ErrorCode::", stringify!($code), "`].")]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )*
    };
}

impl Error {
    /// Build an error, tagging it with the current request's trace id.
    /// A blank message is replaced by a default for `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.default_message().to_owned(),
            trace_id: current_trace_id(),
            details: None,
        })
    }

    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: current_trace_id(),
            details: None,
        })
    }

    code_constructors! {
        invalid_request => InvalidRequest,
        unauthorized => Unauthorized,
        forbidden => Forbidden,
        not_found => NotFound,
        conflict => Conflict,
        internal => InternalError,
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn is_internal(&self) -> bool {
        self.code == ErrorCode::InternalError
    }

    /// Override the captured trace id, e.g. when rebuilding a redacted copy.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach machine-readable context such as `{"field": "endDate"}`.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn current_trace_id() -> Option<String> {
    TraceId::current().map(|id| id.to_string())
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

/// JSON body shape: `{code, message, traceId?, details?}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireError {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for WireError {
    fn from(error: Error) -> Self {
        Self {
            code: error.code,
            message: error.message,
            trace_id: error.trace_id,
            details: error.details,
        }
    }
}

impl TryFrom<WireError> for Error {
    type Error = ErrorValidationError;

    fn try_from(wire: WireError) -> Result<Self, Self::Error> {
        let error = Error::try_new(wire.code, wire.message)?;
        Ok(Self {
            trace_id: wire.trace_id,
            details: wire.details,
            ..error
        })
    }
}
