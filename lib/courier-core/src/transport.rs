//! The seam between request resolution and the network.

use std::future::Future;

use crate::{Request, Response, Result};

/// Performs a single HTTP exchange.
///
/// Implementations buffer the whole response body and honor the request's
/// [`TransportOptions`](crate::TransportOptions) as far as they can. They do
/// not classify statuses: a 404 is a successful exchange at this level.
///
/// # Example
///
/// A canned transport, handy in tests:
///
/// ```
/// use std::future::Future;
/// use courier_core::{Request, Response, Result, Transport};
///
/// struct Canned(u16);
///
/// impl Transport for Canned {
///     fn execute(&self, _request: Request) -> impl Future<Output = Result<Response>> + Send {
///         let status = self.0;
///         async move { Ok(Response::new(status, Default::default(), Default::default())) }
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Send `request` and buffer the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained:
    /// - network and TLS errors
    /// - redirect policy violations
    /// - request mode violations
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}
