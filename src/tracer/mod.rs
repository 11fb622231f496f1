//! Tracing backend contracts.
//!
//! # Data Flow
//! ```text
//! TracingInterceptor
//!     → Tracer::process_incoming_http_request(&dyn HttpRequestInfo) → Box<dyn Span>
//!     → Span::set_error / Span::set_response
//!     → Span::close
//! Host shutdown
//!     → Tracer::close (only by the configured owner)
//! ```
//!
//! # Design Decisions
//! - The backend is injected; nothing here assumes it is the only user of a tracer
//! - Every call may fail with [`TracingError`]; callers contain the failure
//! - `log.rs` ships a backend that reports spans through the `tracing` crate

pub mod log;

use std::fmt;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::config::TracerConfig;
use crate::metadata::{HttpRequestInfo, HttpResponseInfo};

pub use log::{LogSpan, LogTracer};

/// Errors raised by a tracing backend.
#[derive(Debug, Error)]
pub enum TracingError {
    /// The backend could not start a span.
    #[error("failed to start span: {0}")]
    SpanStart(String),

    /// An attribute could not be attached to a span.
    #[error("failed to record span attribute: {0}")]
    Record(String),

    /// The span could not be finished or exported.
    #[error("failed to finish span: {0}")]
    Finish(String),

    /// The tracer has been closed.
    #[error("tracer is closed")]
    Closed,
}

/// An error produced by wrapped application logic.
///
/// Only displayed and debug-printed by spans; never converted or wrapped.
pub trait ApplicationError: fmt::Debug + fmt::Display {}

impl<E: fmt::Debug + fmt::Display> ApplicationError for E {}

/// Creates spans for inbound requests.
pub trait Tracer: Send + Sync {
    fn process_incoming_http_request(
        &self,
        request: &dyn HttpRequestInfo,
    ) -> Result<Box<dyn Span>, TracingError>;

    /// Tear the tracer down. Must be idempotent.
    fn close(&self) -> Result<(), TracingError>;
}

/// One observed request.
pub trait Span: Send {
    /// Attach the application error, if any.
    fn set_error(&mut self, error: Option<&dyn ApplicationError>) -> Result<(), TracingError>;

    fn set_response(&mut self, response: &dyn HttpResponseInfo) -> Result<(), TracingError>;

    /// Finish the span. Consumes it, so a span can only be closed once.
    fn close(self: Box<Self>) -> Result<(), TracingError>;
}

static GLOBAL_TRACER: OnceLock<Arc<LogTracer>> = OnceLock::new();

/// Process-wide default tracer, created on first use.
pub fn global() -> Arc<dyn Tracer> {
    GLOBAL_TRACER
        .get_or_init(|| Arc::new(LogTracer::new(&TracerConfig::default())))
        .clone()
}
