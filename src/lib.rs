//! Fail-safe HTTP tracing interceptor.
//!
//! Every inbound request is reported to a tracing backend, and nothing the
//! backend does (failing, panicking, or being closed) can change what the
//! application does or returns.

// Core
pub mod filter;
pub mod metadata;
pub mod tracer;

// Adapters and hosting
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use filter::{TracerHandle, TracingInterceptor, TracingInterceptorLayer};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use metadata::{MetadataExt, MetadataKey};
pub use tracer::{Span, Tracer, TracingError};
