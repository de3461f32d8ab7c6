//! Error types for courier.
//!
//! Failures come in two kinds, see [`ErrorKind`]:
//! - [`Error::Http`]: the server answered with a status outside `200..=299`.
//!   The [`HttpFailure`] carries the status and the best-effort decoded body.
//! - everything else: the request never produced a usable response
//!   (connection, abort, serialization, unsupported content type...).

use std::fmt;

use derive_more::{Display, Error, From};

// ============================================================================
// HTTP Failure
// ============================================================================

/// Body of a non-success response, in the richest form that could be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// The body parsed as JSON.
    Json(serde_json::Value),
    /// The body was not JSON, kept as (lossy UTF-8) text.
    Text(String),
}

impl ErrorBody {
    /// The JSON value, if the body parsed as JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The raw text, if the body was not JSON.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Deserialize a JSON body into a typed error payload.
    ///
    /// Returns `None` for text bodies.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.as_json().map(|value| {
            serde_path_to_error::deserialize(value).map_err(|e| {
                Error::json_deserialization(e.path().to_string(), e.inner().to_string())
            })
        })
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A response whose status is outside `200..=299`.
#[derive(Debug, Clone, PartialEq, Display)]
#[display("HTTP error {status}: {message}")]
pub struct HttpFailure {
    status: u16,
    message: String,
    body: ErrorBody,
}

impl HttpFailure {
    /// Create a failure, deriving the message from the status reason phrase.
    #[must_use]
    pub fn new(status: u16, body: ErrorBody) -> Self {
        let message = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        Self {
            status,
            message,
            body,
        }
    }

    /// Create a failure with an explicit message.
    #[must_use]
    pub fn with_message(status: u16, message: impl Into<String>, body: ErrorBody) -> Self {
        Self {
            status,
            message: message.into(),
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Decoded response body.
    #[must_use]
    pub const fn body(&self) -> &ErrorBody {
        &self.body
    }

    /// Consume into the decoded body.
    #[must_use]
    pub fn into_body(self) -> ErrorBody {
        self.body
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// The two top-level failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The server answered with a non-success status.
    Http,
    /// Client, transport or protocol failure, no status available.
    Protocol,
}

/// Main error type for courier operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Non-success HTTP response.
    #[display("{_0}")]
    #[from]
    Http(#[error(not(source))] HttpFailure),

    /// Successful response with a content type the decoder does not handle.
    #[display("unsupported content type: {_0:?}")]
    #[from(skip)]
    UnsupportedContentType(#[error(not(source))] String),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The request was cancelled through its abort signal.
    #[display("request aborted")]
    #[from(skip)]
    Aborted,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Invalid header name or value.
    #[display("invalid header: {_0}")]
    #[from(skip)]
    InvalidHeader(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Too many redirects.
    #[display("too many redirects ({count} exceeded max of {max})")]
    #[from(skip)]
    TooManyRedirects {
        /// Number of redirects followed.
        count: usize,
        /// Maximum allowed redirects.
        max: usize,
    },

    /// Invalid redirect response.
    #[display("invalid redirect: {_0}")]
    #[from(skip)]
    InvalidRedirect(#[error(not(source))] String),

    /// A redirect was received while the redirect policy forbids them.
    #[display("redirect {status} to '{location}' refused by redirect policy")]
    #[from(skip)]
    RedirectNotAllowed {
        /// Redirect status code.
        status: u16,
        /// Location the server redirected to.
        location: String,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP failure from a status code and decoded body.
    #[must_use]
    pub fn http(status: u16, body: ErrorBody) -> Self {
        Self::Http(HttpFailure::new(status, body))
    }

    /// Create an unsupported content type error.
    #[must_use]
    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType(content_type.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid header error.
    #[must_use]
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Which of the two failure kinds this is.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) => ErrorKind::Http,
            _ => ErrorKind::Protocol,
        }
    }

    /// Returns `true` for non-success HTTP responses.
    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Returns `true` if the request was aborted.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` for a successful response with an unhandled content type.
    #[must_use]
    pub const fn is_unsupported_content_type(&self) -> bool {
        matches!(self, Self::UnsupportedContentType(_))
    }

    /// The HTTP failure, if this is one.
    #[must_use]
    pub const fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            Self::Http(failure) => Some(failure),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is an HTTP failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http(failure) => Some(failure.status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns the decoded response body if this is an HTTP failure.
    #[must_use]
    pub const fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Http(failure) => Some(&failure.body),
            _ => None,
        }
    }

    /// Try to decode the HTTP failure body as a typed JSON payload.
    ///
    /// Returns `None` when this is not an HTTP failure or the body is text.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct ApiError {
    ///     code: String,
    /// }
    ///
    /// match client.get("/users/42").send().await {
    ///     Ok(found) => println!("{:?}", found.data),
    ///     Err(e) => {
    ///         if let Some(Ok(api_error)) = e.decode_body::<ApiError>() {
    ///             println!("API error: {}", api_error.code);
    ///         }
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().and_then(ErrorBody::decode)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;

    #[test]
    fn error_display() {
        let err = Error::http(404, ErrorBody::Text("missing".to_string()));
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");

        let err = Error::Aborted;
        assert_eq!(err.to_string(), "request aborted");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");

        let err = Error::unsupported_content_type("application/xml");
        assert_eq!(
            err.to_string(),
            "unsupported content type: \"application/xml\""
        );

        let err = Error::json_deserialization("user.address.city", "missing field `city`");
        assert_eq!(
            err.to_string(),
            "JSON deserialization error at 'user.address.city': missing field `city`"
        );
    }

    #[test]
    fn error_kind() {
        check!(Error::http(500, ErrorBody::Text(String::new())).kind() == ErrorKind::Http);
        check!(Error::Aborted.kind() == ErrorKind::Protocol);
        check!(Error::unsupported_content_type("application/xml").kind() == ErrorKind::Protocol);
        check!(Error::connection("refused").kind() == ErrorKind::Protocol);
    }

    #[test]
    fn error_status() {
        let err = Error::http(404, ErrorBody::Text(String::new()));
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = Error::http(503, ErrorBody::Text(String::new()));
        assert_eq!(err.status(), Some(503));
        assert!(err.is_server_error());

        let err = Error::Aborted;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn unknown_status_message() {
        let failure = HttpFailure::new(599, ErrorBody::Text(String::new()));
        assert_eq!(failure.message(), "Unknown Status");
    }

    #[test]
    fn error_body_accessors() {
        let body = ErrorBody::Json(json!({"error": "nope"}));
        check!(body.as_json() == Some(&json!({"error": "nope"})));
        check!(body.as_text().is_none());
        check!(body.to_string() == r#"{"error":"nope"}"#);

        let body = ErrorBody::Text("plain".to_string());
        check!(body.as_text() == Some("plain"));
        check!(body.as_json().is_none());
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            error: String,
        }

        let err = Error::http(404, ErrorBody::Json(json!({"error": "not found"})));
        let_assert!(Some(Ok(decoded)) = err.decode_body::<ApiError>());
        assert_eq!(
            decoded,
            ApiError {
                error: "not found".to_string()
            }
        );

        let err = Error::http(404, ErrorBody::Text("not found".to_string()));
        assert!(err.decode_body::<ApiError>().is_none());

        assert!(Error::Aborted.decode_body::<ApiError>().is_none());
    }

    #[test]
    fn http_failure_from_conversion() {
        let failure = HttpFailure::with_message(418, "teapot", ErrorBody::Text(String::new()));
        let err = Error::from(failure.clone());
        check!(err.http_failure() == Some(&failure));
        check!(err.is_http());
    }
}
