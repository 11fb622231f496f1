//! Tracer backed by the `tracing` crate.
//!
//! Each request becomes an `http.request` span carrying HTTP semantic
//! convention fields, so whatever subscriber the host installs (fmt, JSON,
//! OpenTelemetry bridge) receives it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::{SpanId, TraceContextExt, TraceId};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{IdGenerator, RandomIdGenerator};
use tracing::field::{display, Empty};

use crate::config::TracerConfig;
use crate::metadata::{request, response, HttpRequestInfo, HttpResponseInfo, KeyId, MetadataSource};
use crate::tracer::{ApplicationError, Span, Tracer, TracingError};

const TRACE_HEADERS: [&str; 2] = ["traceparent", "tracestate"];

const REQUEST_FIELDS: [(KeyId, &str); 6] = [
    (request::METHOD.id(), request::METHOD.name()),
    (request::HOST.id(), request::HOST.name()),
    (request::PATH.id(), request::PATH.name()),
    (request::USER_AGENT.id(), request::USER_AGENT.name()),
    (request::REMOTE_ADDR.id(), request::REMOTE_ADDR.name()),
    (request::CONTENT_LENGTH.id(), request::CONTENT_LENGTH.name()),
];

const RESPONSE_FIELDS: [(KeyId, &str); 2] = [
    (response::STATUS_CODE.id(), response::STATUS_CODE.name()),
    (response::CONTENT_LENGTH.id(), response::CONTENT_LENGTH.name()),
];

/// Reads W3C trace context headers from a request view.
struct RequestHeaderExtractor<'a>(&'a dyn HttpRequestInfo);

impl Extractor for RequestHeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.header(key)
    }

    fn keys(&self) -> Vec<&str> {
        TRACE_HEADERS.to_vec()
    }
}

/// Trace context of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: TraceId,
    pub parent_span_id: Option<SpanId>,
}

impl TraceContext {
    /// Continue the caller's trace from a valid `traceparent` header.
    pub fn extract(request: &dyn HttpRequestInfo) -> Option<Self> {
        let context = TraceContextPropagator::new().extract(&RequestHeaderExtractor(request));
        let span = context.span();
        let parent = span.span_context();
        if !parent.is_valid() {
            return None;
        }
        Some(Self {
            trace_id: parent.trace_id(),
            parent_span_id: Some(parent.span_id()),
        })
    }

    /// Start a new trace.
    pub fn generate(ids: &dyn IdGenerator) -> Self {
        Self {
            trace_id: ids.new_trace_id(),
            parent_span_id: None,
        }
    }
}

fn record_fields<S>(span: &tracing::Span, source: &S, fields: &[(KeyId, &str)])
where
    S: MetadataSource + ?Sized,
{
    for (key, name) in fields {
        if let Some(value) = source.lookup(*key) {
            span.record(*name, display(value));
        }
    }
}

/// Tracer that reports requests as `tracing` spans.
#[derive(Debug)]
pub struct LogTracer {
    service_name: String,
    propagate_trace_context: bool,
    ids: RandomIdGenerator,
    closed: AtomicBool,
}

impl LogTracer {
    /// Create an open tracer from config.
    pub fn new(config: &TracerConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            propagate_trace_context: config.propagate_trace_context,
            ids: RandomIdGenerator::default(),
            closed: AtomicBool::new(false),
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn trace_context(&self, request: &dyn HttpRequestInfo) -> TraceContext {
        if self.propagate_trace_context {
            if let Some(ctx) = TraceContext::extract(request) {
                return ctx;
            }
        }
        TraceContext::generate(&self.ids)
    }
}

impl Tracer for LogTracer {
    fn process_incoming_http_request(
        &self,
        request: &dyn HttpRequestInfo,
    ) -> Result<Box<dyn Span>, TracingError> {
        if self.is_closed() {
            return Err(TracingError::Closed);
        }

        let context = self.trace_context(request);
        let span_id = self.ids.new_span_id();

        let span = tracing::info_span!(
            target: "failsafe_tracing::request",
            "http.request",
            service.name = %self.service_name,
            otel.kind = "server",
            trace_id = %context.trace_id,
            span_id = %span_id,
            parent_span_id = Empty,
            http.request.method = Empty,
            server.address = Empty,
            url.path = Empty,
            user_agent.original = Empty,
            client.address = Empty,
            http.request.body.size = Empty,
            http.response.status_code = Empty,
            http.response.body.size = Empty,
            error.message = Empty,
        );
        if let Some(parent) = &context.parent_span_id {
            span.record("parent_span_id", display(parent));
        }
        record_fields(&span, request, &REQUEST_FIELDS);

        Ok(Box::new(LogSpan {
            span,
            started: Instant::now(),
            failed: false,
        }))
    }

    fn close(&self) -> Result<(), TracingError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(service = %self.service_name, "Tracer closed");
        }
        Ok(())
    }
}

/// Span produced by [`LogTracer`].
#[derive(Debug)]
pub struct LogSpan {
    span: tracing::Span,
    started: Instant,
    failed: bool,
}

impl Span for LogSpan {
    fn set_error(&mut self, error: Option<&dyn ApplicationError>) -> Result<(), TracingError> {
        if let Some(error) = error {
            self.failed = true;
            self.span.record("error.message", display(error));
            tracing::warn!(parent: &self.span, error = %error, "Application returned an error");
        }
        Ok(())
    }

    fn set_response(&mut self, response: &dyn HttpResponseInfo) -> Result<(), TracingError> {
        record_fields(&self.span, response, &RESPONSE_FIELDS);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), TracingError> {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            parent: &self.span,
            elapsed_ms = format!("{:.2}", elapsed_ms).as_str(),
            failed = self.failed,
            "Request completed"
        );
        Ok(())
    }
}
