//! Containment of tracing-layer faults.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::observability::metrics;
use crate::tracer::TracingError;

/// Where in the request lifecycle a tracing fault happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultSite {
    Open,
    Record,
    Release,
    Close,
}

impl FaultSite {
    /// Metric label for this site.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultSite::Open => "open",
            FaultSite::Record => "record",
            FaultSite::Release => "release",
            FaultSite::Close => "close",
        }
    }
}

impl fmt::Display for FaultSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run a tracer operation, turning any error or panic into a logged `None`.
pub(crate) fn contain<T, F>(site: FaultSite, op: F) -> Option<T>
where
    F: FnOnce() -> Result<T, TracingError>,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::error!(site = %site, error = %e, "Error occurred in tracing");
            metrics::record_fault(site);
            None
        }
        Err(payload) => {
            tracing::error!(site = %site, panic = panic_message(payload.as_ref()), "Tracer panicked");
            metrics::record_fault(site);
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
