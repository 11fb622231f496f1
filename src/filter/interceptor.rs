//! The fail-safe interception protocol.

use std::future::Future;

use crate::config::FilterConfig;
use crate::filter::fault::{contain, FaultSite};
use crate::filter::handle::TracerHandle;
use crate::filter::pattern::{PatternError, UrlPatterns};
use crate::metadata::{request, HttpRequestInfo, MetadataExt, NoResponse, ProtocolMessage, ProtocolResponse};
use crate::observability::metrics;
use crate::tracer::{ApplicationError, Span, Tracer};

/// Application logic waiting to run, or the result of running it.
///
/// Running consumes the message and the chain, so a completed invocation
/// can never run again.
pub(crate) enum Invocation<M, F, O> {
    Pending { message: M, chain: F },
    Completed(O),
}

impl<M, F, Fut, O> Invocation<M, F, O>
where
    F: FnOnce(M) -> Fut,
    Fut: Future<Output = O>,
{
    pub(crate) fn new(message: M, chain: F) -> Self {
        Invocation::Pending { message, chain }
    }

    pub(crate) fn is_invoked(&self) -> bool {
        matches!(self, Invocation::Completed(_))
    }

    pub(crate) async fn run(self) -> Self {
        match self {
            Invocation::Pending { message, chain } => Invocation::Completed(chain(message).await),
            completed => completed,
        }
    }

    pub(crate) fn outcome(&self) -> Option<&O> {
        match self {
            Invocation::Completed(outcome) => Some(outcome),
            Invocation::Pending { .. } => None,
        }
    }

    /// The outcome, running the chain first if it has not run yet.
    pub(crate) async fn finish(self) -> O {
        match self {
            Invocation::Pending { message, chain } => chain(message).await,
            Invocation::Completed(outcome) => outcome,
        }
    }
}

/// Owns an open span and closes it exactly once, on release or drop.
pub(crate) struct SpanScope {
    span: Option<Box<dyn Span>>,
}

impl SpanScope {
    pub(crate) fn open(tracer: &dyn Tracer, request: &dyn HttpRequestInfo) -> Option<Self> {
        contain(FaultSite::Open, || tracer.process_incoming_http_request(request))
            .map(|span| Self { span: Some(span) })
    }

    /// Attach the application outcome. The response is recorded even on error.
    pub(crate) fn record<R, E>(&mut self, outcome: &Result<R, E>)
    where
        R: ProtocolResponse,
        E: ApplicationError,
    {
        let Some(span) = self.span.as_mut() else {
            return;
        };
        contain(FaultSite::Record, || {
            span.set_error(outcome.as_ref().err().map(|e| e as &dyn ApplicationError))?;
            match outcome.as_ref().ok().and_then(|r| r.http_response()) {
                Some(response) => span.set_response(response.as_ref()),
                None => span.set_response(&NoResponse),
            }
        });
    }

    pub(crate) fn release(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(span) = self.span.take() {
            contain(FaultSite::Release, || span.close());
        }
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        self.close();
    }
}

enum Admission {
    Bypass(&'static str),
    /// `None` when the span could not be opened.
    Trace(Option<SpanScope>),
}

/// Wraps request handling so every request is traced without tracing ever
/// changing what the application does or returns.
pub struct TracingInterceptor {
    tracer: TracerHandle,
    enabled: bool,
    patterns: UrlPatterns,
}

impl TracingInterceptor {
    /// Build from filter config. Fails on a malformed URL pattern.
    pub fn new(tracer: TracerHandle, config: &FilterConfig) -> Result<Self, PatternError> {
        Ok(Self {
            tracer,
            enabled: config.enabled,
            patterns: UrlPatterns::parse(&config.url_patterns)?,
        })
    }

    /// Traces every HTTP request.
    pub fn with_defaults(tracer: TracerHandle) -> Self {
        Self {
            tracer,
            enabled: true,
            patterns: UrlPatterns::all(),
        }
    }

    /// The tracer this interceptor reports to.
    pub fn tracer(&self) -> &TracerHandle {
        &self.tracer
    }

    /// Release the tracer if this interceptor owns it. Safe to call repeatedly.
    pub fn destroy(&self) -> bool {
        self.tracer.shutdown()
    }

    fn admit<M: ProtocolMessage>(&self, message: &M) -> Admission {
        if !self.enabled {
            return Admission::Bypass("disabled");
        }
        let Some(info) = message.http_request() else {
            return Admission::Bypass("not_http");
        };
        let path = info.try_get(request::PATH).unwrap_or_default();
        if !self.patterns.matches(&path) {
            return Admission::Bypass("unmatched_path");
        }
        Admission::Trace(SpanScope::open(self.tracer.tracer(), info.as_ref()))
    }

    /// Run `chain` with `message` exactly once, tracing it when possible.
    ///
    /// The chain's result is returned unchanged. Tracing faults are logged
    /// and never returned.
    pub async fn intercept<M, F, Fut, R, E>(&self, message: M, chain: F) -> Result<R, E>
    where
        M: ProtocolMessage,
        F: FnOnce(M) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: ProtocolResponse,
        E: ApplicationError,
    {
        let scope = match self.admit(&message) {
            Admission::Bypass(reason) => {
                metrics::record_bypassed(reason);
                return chain(message).await;
            }
            Admission::Trace(scope) => scope,
        };
        metrics::record_traced();

        let mut invocation = Invocation::new(message, chain);
        if let Some(mut scope) = scope {
            invocation = invocation.run().await;
            if let Some(outcome) = invocation.outcome() {
                scope.record(outcome);
            }
            scope.release();
        }

        if !invocation.is_invoked() {
            tracing::debug!("Span unavailable; invoking application untraced");
        }
        let outcome = invocation.finish().await;
        if outcome.is_err() {
            metrics::record_application_error();
        }
        outcome
    }
}
