//! Request error types.
//!
//! A [`BindError`] is the recoverable failure of a decode call: the request
//! itself was malformed and the client should be told so. Misuse of the
//! binding API by the calling code is never reported through this type; see
//! [`crate::SchemaError`] and the contract-violation panics instead.

use bytes::Bytes;
use http::{header, Response, StatusCode};
use std::error::Error as StdError;
use std::fmt;

use crate::codec::CodecError;

/// Boxed error used for wrapped causes.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindErrorKind {
    /// Body, query string or JSON document could not be parsed
    Malformed,
    /// A field value failed to parse
    InvalidField,
    /// A required header is absent
    MissingHeader,
    /// Content-Type is disallowed by configuration
    UnsupportedMediaType,
}

/// Error returned when a request cannot be bound to a record.
///
/// Carries an HTTP status code, an optional message and an optional
/// underlying cause. The rendered form is `HTTP <code> <message>: <cause>`,
/// with each empty segment omitted.
///
/// # Example
///
/// ```rust
/// use reqbind::BindError;
/// use http::StatusCode;
///
/// let err = BindError::missing_header("X-Foo");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "HTTP 400 missing header X-Foo");
/// ```
#[derive(Debug)]
pub struct BindError {
    kind: BindErrorKind,
    status: StatusCode,
    message: String,
    cause: Option<BoxError>,
}

impl BindError {
    /// Creates a 400 error for input that could not be parsed.
    #[must_use]
    pub fn malformed(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            kind: BindErrorKind::Malformed,
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Creates a 400 error with a message and no cause.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            kind: BindErrorKind::Malformed,
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a 400 error for a field whose value failed to parse.
    #[must_use]
    pub fn invalid_field(err: FieldError) -> Self {
        Self {
            kind: BindErrorKind::InvalidField,
            status: StatusCode::BAD_REQUEST,
            message: String::new(),
            cause: Some(Box::new(err)),
        }
    }

    /// Creates a 400 error for a required header that is absent.
    #[must_use]
    pub fn missing_header(name: &str) -> Self {
        Self {
            kind: BindErrorKind::MissingHeader,
            status: StatusCode::BAD_REQUEST,
            message: format!("missing header {name}"),
            cause: None,
        }
    }

    /// Creates a 415 error for a body type the configuration rejects.
    #[must_use]
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self {
            kind: BindErrorKind::UnsupportedMediaType,
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message: message.into(),
            cause: None,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Returns the human-readable message, possibly empty.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the wrapped cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            BindErrorKind::Malformed => "MALFORMED_REQUEST",
            BindErrorKind::InvalidField => "INVALID_PARAMETER",
            BindErrorKind::MissingHeader => "MISSING_HEADER",
            BindErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
        }
    }

    /// Builds a JSON error response carrying this error's status.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let envelope = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });
        let mut response = Response::new(Bytes::from(envelope.to_string()));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        response
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status.as_u16())?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl StdError for BindError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// A field value that failed to parse.
#[derive(Debug, thiserror::Error)]
#[error("invalid {field}: {cause}")]
pub struct FieldError {
    field: String,
    #[source]
    cause: CodecError,
}

impl FieldError {
    pub(crate) fn new(field: impl Into<String>, cause: CodecError) -> Self {
        Self {
            field: field.into(),
            cause,
        }
    }

    /// Returns the bound name of the field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}
