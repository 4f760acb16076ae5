//! Error types shared by the finalization stage and the error renderer.
//!
//! [`ResponderError`] names what went wrong inside the responder, while [`HttpError`] is the
//! structured, renderable form every error takes once it reaches the client.

use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// The error type passed along the handler chain.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Category tag carried by errors raised by the responder itself.
pub const ERROR_CATEGORY: &str = "micro-responder";

#[derive(Error, Debug)]
pub enum ResponderError {
    /// neither a status code nor a body was produced by the downstream chain
    #[error("invalid response")]
    InvalidResponse,

    #[error("{source}")]
    Encoding { source: BoxError },
}

impl ResponderError {
    pub fn encoding<E: Into<BoxError>>(e: E) -> Self {
        Self::Encoding { source: e.into() }
    }
}

/// How an [`HttpError`] is written into a response body.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ErrorFormat {
    /// `category=<category>, message=<message>`, served as `text/plain`
    #[default]
    Text,
    /// the serialized error object, served as `application/json`
    Json,
}

/// An error with enough information to be turned into an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "is_false")]
    exception: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref, reason = "signature required by serde")]
fn is_false(b: &bool) -> bool {
    !*b
}

impl HttpError {
    pub fn new<S: ToString>(status: StatusCode, message: S) -> Self {
        Self { status_code: status.as_u16(), category: None, message: message.to_string(), exception: false }
    }

    /// Wraps any error as an unexpected (exception) error with the given status.
    pub fn with_status<E: fmt::Display + ?Sized>(e: &E, status: StatusCode) -> Self {
        Self::new(status, e).exception(true)
    }

    #[must_use]
    pub fn category<S: ToString>(mut self, category: S) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Marks the error as unexpected, rather than an expected domain error.
    #[must_use]
    pub fn exception(mut self, exception: bool) -> Self {
        self.exception = exception;
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category_tag(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_exception(&self) -> bool {
        self.exception
    }

    /// Renders the error as a response body along with its content type.
    pub fn render(&self, format: ErrorFormat) -> (HeaderValue, Bytes) {
        match format {
            ErrorFormat::Text => (crate::mime_header(&mime::TEXT_PLAIN_UTF_8), Bytes::from(self.to_string())),
            ErrorFormat::Json => match serde_json::to_vec(self) {
                Ok(json) => (crate::mime_header(&mime::APPLICATION_JSON), Bytes::from(json)),
                // a struct of strings always serializes, keep the text form as a fallback
                Err(_) => self.render(ErrorFormat::Text),
            },
        }
    }

    /// Converts a boxed chain error into an [`HttpError`], keeping it if it already is one.
    pub fn from_boxed(e: BoxError) -> Self {
        match e.downcast::<HttpError>() {
            Ok(http_error) => *http_error,
            Err(other) => Self::with_status(&*other, StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.category {
            Some(category) => write!(f, "category={category}, message={}", self.message),
            None => write!(f, "message={}", self.message),
        }
    }
}

impl Error for HttpError {}

impl From<ResponderError> for HttpError {
    fn from(e: ResponderError) -> Self {
        match e {
            ResponderError::InvalidResponse => {
                Self::with_status(&e, StatusCode::INTERNAL_SERVER_ERROR).category(ERROR_CATEGORY)
            }
            ResponderError::Encoding { source } => Self::with_status(&*source, StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ERROR_CATEGORY, ErrorFormat, HttpError, ResponderError};
    use http::StatusCode;
    use std::io;

    #[test]
    fn test_invalid_response_rendering() {
        let e = HttpError::from(ResponderError::InvalidResponse);
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.category_tag(), Some(ERROR_CATEGORY));
        assert!(e.is_exception());

        let (content_type, body) = e.render(ErrorFormat::Text);
        assert_eq!(content_type, "text/plain; charset=utf-8");
        assert_eq!(body, "category=micro-responder, message=invalid response");
    }

    #[test]
    fn test_json_rendering() {
        let e = HttpError::new(StatusCode::BAD_REQUEST, "name is required").category("user");
        let (content_type, body) = e.render(ErrorFormat::Json);
        assert_eq!(content_type, "application/json");
        assert_eq!(body, r#"{"statusCode":400,"category":"user","message":"name is required"}"#);
    }

    #[test]
    fn test_encoding_error_has_no_category() {
        let e = HttpError::from(ResponderError::encoding(io::Error::other("broken pipe")));
        assert_eq!(e.to_string(), "message=broken pipe");
        let (_, body) = e.render(ErrorFormat::Json);
        assert_eq!(body, r#"{"statusCode":500,"message":"broken pipe","exception":true}"#);
    }

    #[test]
    fn test_from_boxed_keeps_http_error() {
        let original = HttpError::new(StatusCode::NOT_FOUND, "missing");
        let e = HttpError::from_boxed(Box::new(original.clone()));
        assert_eq!(e, original);

        let e = HttpError::from_boxed("plain failure".into());
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message(), "plain failure");
        assert!(e.is_exception());
    }
}
