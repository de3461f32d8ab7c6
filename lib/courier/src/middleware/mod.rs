//! Tower middleware layers for the hyper transport.
//!
//! [`HyperTransport`](crate::HyperTransport) stacks these layers around the
//! raw hyper service, outermost first:
//!
//! 1. [`LoggingLayer`] - one `tracing` span per exchange, redirects included
//! 2. [`RedirectLayer`] - applies the request's [`RedirectPolicy`](courier_core::RedirectPolicy)
//! 3. [`RequestPolicyLayer`] - credentials, request mode, referrer and cache
//!    options, checked on every hop
//!
//! Extra layers added through [`HyperTransportBuilder::layer`](crate::HyperTransportBuilder::layer)
//! wrap the whole stack.
//!
//! # Example
//!
//! ```ignore
//! use courier::HyperTransport;
//! use courier::middleware::ConcurrencyLimitLayer;
//!
//! let transport = HyperTransport::builder()
//!     .layer(ConcurrencyLimitLayer::new(8))
//!     .build();
//! ```

mod logging;
mod policy;
mod redirect;

pub use logging::{LogLevel, Logging, LoggingLayer};
pub use policy::{RequestPolicy, RequestPolicyLayer, apply as apply_request_policy};
pub use redirect::{Redirect, RedirectLayer};

// Re-export tower types for convenience
pub use tower::limit::ConcurrencyLimitLayer;
pub use tower::{Layer, ServiceBuilder};
