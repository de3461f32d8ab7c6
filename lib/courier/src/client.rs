//! Fluent request building.
//!
//! A [`Client`] holds read-only configuration and a transport. Each verb
//! method starts a [`PendingRequest`]; chained calls refine its
//! [`RequestDescriptor`] and [`send`](PendingRequest::send) executes it.
//!
//! # Example
//!
//! ```ignore
//! use courier::Client;
//! use serde_json::json;
//!
//! let client = Client::builder()
//!     .base_url("https://api.example.com")
//!     .prefix("/v1")
//!     .header("x-api-key", "secret")
//!     .build()?;
//!
//! let created = client
//!     .post("/users")
//!     .json(&json!({"name": "Ada"}))
//!     .send()
//!     .await?;
//! assert_eq!(created.status_code, 201);
//! ```

use std::fmt;
use std::time::Duration;

use courier_core::{
    AbortSignal, HeaderMap, HeaderName, HeaderValue, Normalized, RequestDescriptor, ResponseData,
    Transport, TransportOptions, Value, execute,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::{Error, HyperTransport, Method, Result};

/// Fluent HTTP client.
///
/// Cheap to clone when the transport is; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct Client<T = HyperTransport> {
    transport: T,
    config: ClientConfig,
}

impl Client {
    /// Create a client over a [`HyperTransport`] built from `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let transport = HyperTransport::with_config(config.clone());
        Self { transport, config }
    }

    /// Create a client builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }
}

impl<T: Transport> Client<T> {
    /// Create a client over a custom transport.
    #[must_use]
    pub const fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a request with an arbitrary method.
    #[must_use]
    pub fn request(&self, method: Method, path: impl Into<String>) -> PendingRequest<'_, T> {
        let mut descriptor = RequestDescriptor::new(method, path)
            .with_headers(self.config.default_headers.clone())
            .with_debug(self.config.debug);
        if let Some(base_url) = &self.config.base_url {
            descriptor = descriptor.with_base_url(base_url.clone());
        }
        if let Some(prefix) = &self.config.prefix {
            descriptor = descriptor.with_prefix(prefix.clone());
        }

        PendingRequest {
            client: self,
            descriptor,
            error: None,
        }
    }

    /// Start a GET request.
    #[must_use]
    pub fn get(&self, path: impl Into<String>) -> PendingRequest<'_, T> {
        self.request(Method::Get, path)
    }

    /// Start a GET request with query parameters.
    #[must_use]
    pub fn get_with_query(
        &self,
        path: impl Into<String>,
        query: impl Into<Value>,
    ) -> PendingRequest<'_, T> {
        self.get(path).query_value(query)
    }

    /// Start a POST request.
    #[must_use]
    pub fn post(&self, path: impl Into<String>) -> PendingRequest<'_, T> {
        self.request(Method::Post, path)
    }

    /// Start a POST request with query parameters.
    #[must_use]
    pub fn post_with_query(
        &self,
        path: impl Into<String>,
        query: impl Into<Value>,
    ) -> PendingRequest<'_, T> {
        self.post(path).query_value(query)
    }

    /// Start a PUT request.
    #[must_use]
    pub fn put(&self, path: impl Into<String>) -> PendingRequest<'_, T> {
        self.request(Method::Put, path)
    }

    /// Start a PUT request with query parameters.
    #[must_use]
    pub fn put_with_query(
        &self,
        path: impl Into<String>,
        query: impl Into<Value>,
    ) -> PendingRequest<'_, T> {
        self.put(path).query_value(query)
    }

    /// Start a PATCH request.
    #[must_use]
    pub fn patch(&self, path: impl Into<String>) -> PendingRequest<'_, T> {
        self.request(Method::Patch, path)
    }

    /// Start a PATCH request with query parameters.
    #[must_use]
    pub fn patch_with_query(
        &self,
        path: impl Into<String>,
        query: impl Into<Value>,
    ) -> PendingRequest<'_, T> {
        self.patch(path).query_value(query)
    }

    /// Start a DELETE request.
    #[must_use]
    pub fn delete(&self, path: impl Into<String>) -> PendingRequest<'_, T> {
        self.request(Method::Delete, path)
    }

    /// Start a DELETE request with query parameters.
    #[must_use]
    pub fn delete_with_query(
        &self,
        path: impl Into<String>,
        query: impl Into<Value>,
    ) -> PendingRequest<'_, T> {
        self.delete(path).query_value(query)
    }

    /// Start a HEAD request.
    #[must_use]
    pub fn head(&self, path: impl Into<String>) -> PendingRequest<'_, T> {
        self.request(Method::Head, path)
    }

    /// Start a HEAD request with query parameters.
    #[must_use]
    pub fn head_with_query(
        &self,
        path: impl Into<String>,
        query: impl Into<Value>,
    ) -> PendingRequest<'_, T> {
        self.head(path).query_value(query)
    }

    /// Start an OPTIONS request.
    #[must_use]
    pub fn options(&self, path: impl Into<String>) -> PendingRequest<'_, T> {
        self.request(Method::Options, path)
    }

    /// Start an OPTIONS request with query parameters.
    #[must_use]
    pub fn options_with_query(
        &self,
        path: impl Into<String>,
        query: impl Into<Value>,
    ) -> PendingRequest<'_, T> {
        self.options(path).query_value(query)
    }
}

/// A request being built.
///
/// Every chain step consumes the request and returns a new one. Invalid
/// input (a bad header, an unserializable payload) is remembered and
/// reported by [`send`](Self::send).
#[must_use = "a pending request does nothing until sent"]
pub struct PendingRequest<'a, T> {
    client: &'a Client<T>,
    descriptor: RequestDescriptor,
    error: Option<Error>,
}

impl<T> fmt::Debug for PendingRequest<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("descriptor", &self.descriptor)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> PendingRequest<'_, T> {
    fn fail(mut self, error: Error) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    fn map(mut self, f: impl FnOnce(RequestDescriptor) -> RequestDescriptor) -> Self {
        self.descriptor = f(self.descriptor);
        self
    }

    /// Add query parameters from any serializable value.
    pub fn query<Q: Serialize + ?Sized>(self, query: &Q) -> Self {
        match Value::from_serialize(query) {
            Ok(value) => self.query_value(value),
            Err(err) => self.fail(err),
        }
    }

    /// Add query parameters from a [`Value`].
    pub fn query_value(self, query: impl Into<Value>) -> Self {
        let query = query.into();
        self.map(|descriptor| descriptor.with_query(query))
    }

    /// Set a header, replacing client defaults of the same name.
    pub fn header<K, V>(self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        let name = match name.try_into() {
            Ok(name) => name,
            Err(err) => return self.fail(Error::invalid_header(err.into().to_string())),
        };
        match value.try_into() {
            Ok(value) => self.map(|descriptor| descriptor.with_header(name, value)),
            Err(err) => self.fail(Error::invalid_header(format!("{name}: {}", err.into()))),
        }
    }

    /// Overlay several headers.
    pub fn headers(self, headers: HeaderMap) -> Self {
        self.map(|descriptor| descriptor.with_headers(headers))
    }

    /// Send a multipart form body; nested values and files are flattened.
    pub fn form(self, data: impl Into<Value>) -> Self {
        let data = data.into();
        self.map(|descriptor| descriptor.with_form(data))
    }

    /// Send a JSON body.
    pub fn json<J: Serialize + ?Sized>(self, data: &J) -> Self {
        match Value::from_serialize(data) {
            Ok(value) => self.map(|descriptor| descriptor.with_json(value)),
            Err(err) => self.fail(err),
        }
    }

    /// Replace the transport options.
    pub fn options(self, options: TransportOptions) -> Self {
        self.map(|descriptor| descriptor.with_options(options))
    }

    /// Attach a cancellation signal.
    pub fn signal(self, signal: AbortSignal) -> Self {
        self.map(|descriptor| descriptor.with_signal(signal))
    }

    /// Toggle diagnostic output for this request.
    pub fn debug(self, debug: bool) -> Self {
        self.map(|descriptor| descriptor.with_debug(debug))
    }

    /// The descriptor built so far.
    #[must_use]
    pub const fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Consume into the descriptor.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while chaining.
    pub fn into_descriptor(self) -> Result<RequestDescriptor> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.descriptor),
        }
    }

    /// Execute the request.
    ///
    /// # Errors
    ///
    /// Returns chaining errors, transport errors, [`Error::Http`] for a
    /// status outside `200..=299`, or a decoding error.
    pub async fn send(self) -> Result<Normalized<ResponseData>> {
        let client = self.client;
        let descriptor = self.into_descriptor()?;
        execute(&client.transport, descriptor).await
    }

    /// Execute with last-minute headers and options.
    ///
    /// `headers` override every earlier header of the same name; `options`
    /// replace the options set so far.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_with(
        self,
        headers: HeaderMap,
        options: TransportOptions,
    ) -> Result<Normalized<ResponseData>> {
        self.headers(headers).options(options).send().await
    }

    /// Execute and deserialize the data into `R`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send); additionally [`Error::JsonDeserialization`]
    /// if the data does not fit `R`.
    pub async fn send_json<R: DeserializeOwned>(self) -> Result<Normalized<R>> {
        self.send().await?.into_typed()
    }
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfigBuilder,
    base_url: Option<String>,
    headers: HeaderMap,
    error: Option<Error>,
}

impl ClientBuilder {
    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the path prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config = self.config.prefix(prefix);
        self
    }

    /// Add a default header.
    #[must_use]
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(err), _) => {
                self.error.get_or_insert(Error::invalid_header(err.into().to_string()));
            }
            (_, Err(err)) => {
                self.error.get_or_insert(Error::invalid_header(err.into().to_string()));
            }
        }
        self
    }

    /// Add default headers.
    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        courier_core::merge_headers(&mut self.headers, headers);
        self
    }

    /// Enable diagnostics for every request.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config = self.config.debug(debug);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum number of redirects followed.
    #[must_use]
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config = self.config.max_redirects(max);
        self
    }

    fn into_config(self) -> Result<ClientConfig> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut config = self.config.default_headers(self.headers);
        if let Some(base_url) = self.base_url {
            config = config.base_url(Url::parse(&base_url)?);
        }
        Ok(config.build())
    }

    /// Build a client over a [`HyperTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for a malformed base URL and
    /// [`Error::InvalidHeader`] for a malformed default header.
    pub fn build(self) -> Result<Client> {
        Ok(Client::new(self.into_config()?))
    }

    /// Build a client over a custom transport.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with<T: Transport>(self, transport: T) -> Result<Client<T>> {
        Ok(Client::with_transport(transport, self.into_config()?))
    }
}
