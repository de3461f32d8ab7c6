//! Buffered HTTP responses.
//!
//! The body is read off the wire once into [`Bytes`]; [`Response::text`] and
//! [`Response::json`] can then be called any number of times.

use bytes::Bytes;
use http::{HeaderMap, header};

/// HTTP response with status, headers, and a buffered body.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub const fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `Content-Type` header, or `""` when absent.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status >= 300 && self.status < 400
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(&self.body)
    }

    /// The body as text, invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn with_content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn response_basic() {
        let response = Response::new(
            200,
            with_content_type("application/json"),
            Bytes::from(r#"{"id":1}"#),
        );

        assert_eq!(response.status(), 200);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.content_type(), "application/json");
        assert!(response.is_success());
        assert!(!response.is_client_error());
        assert!(!response.is_server_error());
    }

    #[test]
    fn missing_content_type_is_empty() {
        let response = Response::new(204, HeaderMap::new(), Bytes::new());
        assert_eq!(response.content_type(), "");
    }

    #[test]
    fn response_status_checks() {
        let response = Response::new(301, HeaderMap::new(), Bytes::new());
        assert!(response.is_redirection());

        let response = Response::new(404, HeaderMap::new(), Bytes::new());
        assert!(response.is_client_error());

        let response = Response::new(500, HeaderMap::new(), Bytes::new());
        assert!(response.is_server_error());
    }

    #[test]
    fn body_reads_more_than_once() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            id: u64,
        }

        let response = Response::new(200, HeaderMap::new(), Bytes::from(r#"{"id":1}"#));

        let user: User = response.json().expect("deserialize");
        assert_eq!(user, User { id: 1 });
        assert_eq!(response.text(), r#"{"id":1}"#);
        assert_eq!(response.text(), r#"{"id":1}"#);
    }

    #[test]
    fn text_is_lossy() {
        let response = Response::new(200, HeaderMap::new(), Bytes::from_static(b"ok \xFF"));
        assert_eq!(response.text(), "ok \u{FFFD}");
    }
}
