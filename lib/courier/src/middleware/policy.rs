//! Transport option enforcement.
//!
//! Applied to every hop, after redirects are resolved, so that a redirect to
//! another origin is checked like any other cross-origin request.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use courier_core::{Credentials, HeaderValue, RequestMode, header};
use tower::{Layer, Service};
use tracing::debug;

use crate::{Error, Request, Response, Result};

/// Layer that enforces credentials, request mode, referrer and cache options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestPolicyLayer;

impl RequestPolicyLayer {
    /// Create a new policy layer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestPolicyLayer {
    type Service = RequestPolicy<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestPolicy { inner }
    }
}

/// Service that enforces transport options before calling the inner service.
#[derive(Debug, Clone)]
pub struct RequestPolicy<S> {
    inner: S,
}

/// Rewrite `request` according to its transport options.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] for a cross-origin request in
/// `SameOrigin` mode, [`Error::InvalidHeader`] for a referrer that is not a
/// valid header value.
pub fn apply(mut request: Request) -> Result<Request> {
    let options = request.options().clone();
    let same_origin = request.is_same_origin();

    if options.mode() == RequestMode::SameOrigin && !same_origin {
        return Err(Error::invalid_request(format!(
            "cross-origin request to '{}' refused in same-origin mode",
            request.url()
        )));
    }

    let strip_credentials = match options.credentials() {
        Credentials::Omit => true,
        Credentials::SameOrigin => !same_origin,
        Credentials::Include => false,
    };

    let referer = options
        .referrer()
        .map(|referrer| options.referrer_policy().referer(referrer, request.url()));

    let headers = request.headers_mut();

    if strip_credentials {
        let authorization = headers.remove(header::AUTHORIZATION);
        let cookie = headers.remove(header::COOKIE);
        if authorization.is_some() || cookie.is_some() {
            debug!(credentials = ?options.credentials(), "credentials stripped");
        }
    }

    match referer {
        Some(Some(value)) => {
            let value = HeaderValue::try_from(value)
                .map_err(|e| Error::invalid_header(format!("referer: {e}")))?;
            headers.insert(header::REFERER, value);
        }
        Some(None) => {
            headers.remove(header::REFERER);
        }
        None => {}
    }

    if let Some(directive) = options.cache().cache_control() {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(directive));
    }

    Ok(request)
}

impl<S> Service<Request> for RequestPolicy<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        Box::pin(async move {
            let request = apply(request)?;
            inner.call(request).await
        })
    }
}
