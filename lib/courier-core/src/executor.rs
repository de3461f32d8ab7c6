//! Descriptor execution.
//!
//! [`execute`] resolves a [`RequestDescriptor`], performs exactly one
//! transport call (raced against the abort signal, if any) and decodes the
//! response. With `debug` set, every step is reported through `tracing`
//! under the `courier::debug` target.

use tracing::debug;

use crate::{
    Normalized, RequestDescriptor, ResponseData, Result, Transport, decode,
};

/// `tracing` target for per-request diagnostics.
pub const DEBUG_TARGET: &str = "courier::debug";

/// Execute `descriptor` over `transport`.
///
/// # Errors
///
/// - [`Error::Aborted`](crate::Error::Aborted) if the signal fires before the
///   response is complete, or had already fired;
/// - resolution errors (URL, JSON serialization);
/// - whatever the transport reports;
/// - decoding errors, see [`decode`].
pub async fn execute<T>(transport: &T, descriptor: RequestDescriptor) -> Result<Normalized<ResponseData>>
where
    T: Transport,
{
    let debug = descriptor.debug();
    let result = run(transport, &descriptor).await;

    if debug && let Err(err) = &result {
        debug!(
            target: DEBUG_TARGET,
            method = %descriptor.method(),
            path = descriptor.path(),
            error = %err,
            kind = ?err.kind(),
            "request failed"
        );
    }
    result
}

async fn run<T>(transport: &T, descriptor: &RequestDescriptor) -> Result<Normalized<ResponseData>>
where
    T: Transport,
{
    let signal = descriptor.options().signal().cloned();
    if signal.as_ref().is_some_and(crate::AbortSignal::is_aborted) {
        return Err(crate::Error::Aborted);
    }

    let request = descriptor.resolve()?;

    if descriptor.debug() {
        debug!(
            target: DEBUG_TARGET,
            method = %request.method(),
            endpoint = %request.url(),
            headers = ?request.headers(),
            body_mode = ?descriptor.body_mode(),
            payload = ?descriptor.payload(),
            "sending request"
        );
    }

    let call = transport.execute(request);
    let response = match &signal {
        Some(signal) => signal.guard(call).await?,
        None => call.await?,
    };

    if descriptor.debug() {
        debug!(
            target: DEBUG_TARGET,
            status = response.status(),
            content_type = response.content_type(),
            body = %response.text(),
            "received response"
        );
    }

    decode(&response)
}
