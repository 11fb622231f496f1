//! Tracer ownership.
//!
//! A tracer is often shared with other consumers in the same process. The
//! handle records whether the interceptor owns it, and therefore whether
//! shutting the interceptor down also closes the tracer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::filter::fault::{contain, FaultSite};
use crate::tracer::Tracer;

/// Who is responsible for closing the tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Closed by the interceptor on shutdown.
    Owned,
    /// Closed elsewhere; the interceptor never closes it.
    Shared,
}

/// A tracer plus the interceptor's ownership of it.
#[derive(Clone)]
pub struct TracerHandle {
    tracer: Arc<dyn Tracer>,
    ownership: Ownership,
    released: Arc<AtomicBool>,
}

impl TracerHandle {
    /// Wrap a tracer with explicit ownership.
    pub fn new(tracer: Arc<dyn Tracer>, ownership: Ownership) -> Self {
        Self {
            tracer,
            ownership,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A tracer the interceptor closes on shutdown.
    pub fn owned(tracer: Arc<dyn Tracer>) -> Self {
        Self::new(tracer, Ownership::Owned)
    }

    /// A tracer someone else closes.
    pub fn shared(tracer: Arc<dyn Tracer>) -> Self {
        Self::new(tracer, Ownership::Shared)
    }

    /// Build from the `shutdown_tracer` config flag.
    pub fn from_shutdown_flag(tracer: Arc<dyn Tracer>, shutdown_tracer: bool) -> Self {
        let ownership = if shutdown_tracer {
            Ownership::Owned
        } else {
            Ownership::Shared
        };
        Self::new(tracer, ownership)
    }

    /// The wrapped tracer.
    pub fn tracer(&self) -> &dyn Tracer {
        self.tracer.as_ref()
    }

    /// Whether shutdown closes the tracer.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Close the tracer if it is owned and not closed yet.
    ///
    /// Returns true when this call closed it. Close failures are logged.
    pub fn shutdown(&self) -> bool {
        if self.ownership == Ownership::Shared {
            tracing::debug!("Tracer is shared; leaving it open");
            return false;
        }
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        contain(FaultSite::Close, || self.tracer.close()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::HttpRequestInfo;
    use crate::tracer::{Span, TracingError};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingTracer {
        closes: AtomicUsize,
        fail_close: bool,
    }

    impl Tracer for CountingTracer {
        fn process_incoming_http_request(
            &self,
            _request: &dyn HttpRequestInfo,
        ) -> Result<Box<dyn Span>, TracingError> {
            Err(TracingError::SpanStart("not used".into()))
        }

        fn close(&self) -> Result<(), TracingError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(TracingError::Finish("flush failed".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_owned_tracer_closed_once() {
        let tracer = Arc::new(CountingTracer::default());
        let handle = TracerHandle::owned(tracer.clone());
        let clone = handle.clone();

        assert!(handle.shutdown());
        assert!(!handle.shutdown());
        assert!(!clone.shutdown());
        assert_eq!(tracer.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_tracer_never_closed() {
        let tracer = Arc::new(CountingTracer::default());
        let handle = TracerHandle::from_shutdown_flag(tracer.clone(), false);

        assert_eq!(handle.ownership(), Ownership::Shared);
        assert!(!handle.shutdown());
        assert_eq!(tracer.closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_close_failure_is_contained() {
        let tracer = Arc::new(CountingTracer {
            closes: AtomicUsize::new(0),
            fail_close: true,
        });
        let handle = TracerHandle::owned(tracer.clone());

        assert!(!handle.shutdown());
        assert!(!handle.shutdown());
        assert_eq!(tracer.closes.load(Ordering::SeqCst), 1);
    }
}
