//! Redirect middleware.
//!
//! Applies the request's [`RedirectPolicy`] to 3xx responses carrying a
//! `Location` header:
//! - `Follow`: issue the next hop, up to a maximum number of redirects;
//! - `Error`: fail with [`Error::RedirectNotAllowed`];
//! - `Manual`: hand the 3xx response back unchanged.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use courier_core::{Body, RedirectPolicy, header};
use tower::{Layer, Service};
use tracing::debug;
use url::Url;

use crate::config::DEFAULT_MAX_REDIRECTS;
use crate::{Error, Method, Request, Response, Result};

/// Layer that applies redirect policies.
#[derive(Debug, Clone)]
pub struct RedirectLayer {
    max_redirects: usize,
}

impl Default for RedirectLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RedirectLayer {
    /// Create a redirect layer following up to 20 redirects.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Create a redirect layer with a custom maximum.
    #[must_use]
    pub const fn with_max_redirects(max_redirects: usize) -> Self {
        Self { max_redirects }
    }
}

impl<S> Layer<S> for RedirectLayer {
    type Service = Redirect<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Redirect {
            inner,
            max_redirects: self.max_redirects,
        }
    }
}

/// Service that applies redirect policies.
#[derive(Debug, Clone)]
pub struct Redirect<S> {
    inner: S,
    max_redirects: usize,
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Method for the next hop.
///
/// 303 switches everything but HEAD to GET; 301 and 302 only switch POST.
/// 307 and 308 always preserve the method.
fn redirect_method(status: u16, original: Method) -> Method {
    match status {
        303 if original != Method::Head => Method::Get,
        301 | 302 if original.downgrades_on_redirect() => Method::Get,
        _ => original,
    }
}

fn resolve_location(current: &Url, location: &str) -> Result<Url> {
    current.join(location).map_err(Error::InvalidUrl)
}

/// Turn `request` into the next hop towards `location`.
fn next_hop(mut request: Request, status: u16, location: Url) -> Request {
    let method = redirect_method(status, request.method());
    if method != request.method() {
        request.set_method(method, Body::Empty);
        let headers = request.headers_mut();
        headers.remove(header::CONTENT_TYPE);
        headers.remove(header::CONTENT_LENGTH);
    }
    request.set_url(location);
    request
}

impl<S> Service<Request> for Redirect<S>
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
        let max_redirects = self.max_redirects;

        Box::pin(async move {
            let policy = request.options().redirect();
            let mut current = request;
            let mut redirects = 0;

            loop {
                let response = inner.call(current.clone()).await?;
                if !is_redirect(response.status()) || policy == RedirectPolicy::Manual {
                    return Ok(response);
                }

                let location = response
                    .header(header::LOCATION.as_str())
                    .ok_or_else(|| {
                        Error::InvalidRedirect("redirect response missing Location header".into())
                    })?;
                let location = resolve_location(current.url(), location)?;

                if policy == RedirectPolicy::Error {
                    return Err(Error::RedirectNotAllowed {
                        status: response.status(),
                        location: location.to_string(),
                    });
                }

                if redirects >= max_redirects {
                    return Err(Error::TooManyRedirects {
                        count: redirects,
                        max: max_redirects,
                    });
                }

                debug!(status = response.status(), %location, "following redirect");
                current = next_hop(current, response.status(), location);
                redirects += 1;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("url")
    }

    #[test]
    fn default_max_redirects() {
        assert_eq!(RedirectLayer::new().max_redirects, 20);
        assert_eq!(RedirectLayer::with_max_redirects(5).max_redirects, 5);
    }

    #[test]
    fn redirect_statuses() {
        for status in [301, 302, 303, 307, 308] {
            assert!(is_redirect(status), "{status}");
        }
        for status in [200, 300, 304, 404, 500] {
            assert!(!is_redirect(status), "{status}");
        }
    }

    #[test]
    fn see_other_switches_to_get() {
        assert_eq!(redirect_method(303, Method::Post), Method::Get);
        assert_eq!(redirect_method(303, Method::Delete), Method::Get);
        assert_eq!(redirect_method(303, Method::Head), Method::Head);
    }

    #[test]
    fn moved_and_found_only_switch_post() {
        assert_eq!(redirect_method(301, Method::Post), Method::Get);
        assert_eq!(redirect_method(302, Method::Post), Method::Get);
        assert_eq!(redirect_method(302, Method::Put), Method::Put);
    }

    #[test]
    fn temporary_and_permanent_preserve_method() {
        assert_eq!(redirect_method(307, Method::Post), Method::Post);
        assert_eq!(redirect_method(308, Method::Patch), Method::Patch);
    }

    #[test]
    fn resolve_relative_and_absolute_locations() {
        let base = url("https://example.com/old/path");
        assert_eq!(
            resolve_location(&base, "/new").expect("resolve").as_str(),
            "https://example.com/new"
        );
        assert_eq!(
            resolve_location(&base, "sibling").expect("resolve").as_str(),
            "https://example.com/old/sibling"
        );
        assert_eq!(
            resolve_location(&base, "https://other.com/x").expect("resolve").as_str(),
            "https://other.com/x"
        );
    }

    #[test]
    fn next_hop_drops_body_when_switching_to_get() {
        let request = Request::builder(Method::Post, url("https://a.example.com/form"))
            .header(header::CONTENT_TYPE, courier_core::HeaderValue::from_static("application/json"))
            .body(Body::Json(Bytes::from_static(b"{}")))
            .build();

        let hop = next_hop(request, 303, url("https://a.example.com/done"));

        assert_eq!(hop.method(), Method::Get);
        assert!(hop.body().is_empty());
        assert!(hop.header("content-type").is_none());
        assert_eq!(hop.url().as_str(), "https://a.example.com/done");
        assert_eq!(hop.origin(), &url("https://a.example.com").origin());
    }

    #[test]
    fn next_hop_keeps_body_on_307() {
        let request = Request::builder(Method::Put, url("https://a.example.com/x"))
            .body(Body::Json(Bytes::from_static(b"[1]")))
            .build();

        let hop = next_hop(request, 307, url("https://b.example.com/x"));

        assert_eq!(hop.method(), Method::Put);
        assert!(!hop.body().is_empty());
        assert!(!hop.is_same_origin());
    }
}
