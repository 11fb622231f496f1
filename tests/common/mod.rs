//! Shared utilities for integration tests: a tracer that records what it is
//! asked to do and fails on demand.

#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response};
use failsafe_tracing::metadata::{request, response, HttpRequestInfo, HttpResponseInfo, MetadataExt};
use failsafe_tracing::tracer::{ApplicationError, Span, Tracer, TracingError};

/// How a tracer operation should misbehave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    Error,
    Panic,
}

impl Fault {
    fn inject(self, op: &str) -> Result<(), TracingError> {
        match self {
            Fault::None => Ok(()),
            Fault::Error => Err(TracingError::Record(format!("injected error in {}", op))),
            Fault::Panic => panic!("injected panic in {}", op),
        }
    }
}

/// Which tracer operations fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultPlan {
    pub open: Fault,
    pub set_error: Fault,
    pub set_response: Fault,
    pub close: Fault,
}

impl FaultPlan {
    pub fn everywhere(fault: Fault) -> Self {
        Self {
            open: fault,
            set_error: fault,
            set_response: fault,
            close: fault,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanEvent {
    Opened { path: Option<String> },
    Error(Option<String>),
    Response { status: Option<u16>, content_length: Option<u64> },
    /// Recorded on every close attempt, before any injected fault.
    Closed,
}

#[derive(Default)]
pub struct RecordingTracer {
    plan: FaultPlan,
    events: Arc<Mutex<Vec<SpanEvent>>>,
    tracer_closes: AtomicUsize,
}

impl RecordingTracer {
    pub fn new(plan: FaultPlan) -> Arc<Self> {
        Arc::new(Self {
            plan,
            ..Self::default()
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(FaultPlan::default())
    }

    pub fn events(&self) -> Vec<SpanEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&SpanEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn opened(&self) -> usize {
        self.count(|e| matches!(e, SpanEvent::Opened { .. }))
    }

    pub fn closed(&self) -> usize {
        self.count(|e| matches!(e, SpanEvent::Closed))
    }

    pub fn tracer_closes(&self) -> usize {
        self.tracer_closes.load(Ordering::SeqCst)
    }
}

impl Tracer for RecordingTracer {
    fn process_incoming_http_request(
        &self,
        req: &dyn HttpRequestInfo,
    ) -> Result<Box<dyn Span>, TracingError> {
        self.plan.open.inject("open")?;
        self.events.lock().unwrap().push(SpanEvent::Opened {
            path: req.try_get(request::PATH),
        });
        Ok(Box::new(RecordingSpan {
            plan: self.plan,
            events: self.events.clone(),
        }))
    }

    fn close(&self) -> Result<(), TracingError> {
        self.tracer_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct RecordingSpan {
    plan: FaultPlan,
    events: Arc<Mutex<Vec<SpanEvent>>>,
}

impl Span for RecordingSpan {
    fn set_error(&mut self, error: Option<&dyn ApplicationError>) -> Result<(), TracingError> {
        self.plan.set_error.inject("set_error")?;
        self.events
            .lock()
            .unwrap()
            .push(SpanEvent::Error(error.map(|e| e.to_string())));
        Ok(())
    }

    fn set_response(&mut self, res: &dyn HttpResponseInfo) -> Result<(), TracingError> {
        self.plan.set_response.inject("set_response")?;
        self.events.lock().unwrap().push(SpanEvent::Response {
            status: res.try_get(response::STATUS_CODE),
            content_length: res.try_get(response::CONTENT_LENGTH),
        });
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), TracingError> {
        self.events.lock().unwrap().push(SpanEvent::Closed);
        self.plan.close.inject("close")
    }
}

/// Error returned by test applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFailure(pub String);

impl fmt::Display for RuntimeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RuntimeFailure {}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn ok_response(status: u16) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Length", "2")
        .body(Body::from("ok"))
        .unwrap()
}
