//! Fail-safe request interception.
//!
//! # Data Flow
//! ```text
//! inbound message
//!     → interceptor.rs (bypass check: protocol, enabled, url patterns)
//!     → open span ─────────────┐ fault? logged, span skipped
//!     → invoke application     │
//!     → record outcome         │ fault? logged
//!     → release span           │ fault? logged
//!     → recovery: invoke application if the span never opened
//!     → application's own result, unchanged
//! ```
//!
//! # Design Decisions
//! - The application runs exactly once: the pending invocation is consumed when it runs
//! - Tracer errors and tracer panics are contained in `fault.rs` and never reach the caller
//! - The span is released by a scope guard, so cancellation also closes it
//! - `layer.rs` adapts the interceptor to tower; the interceptor itself is framework-agnostic

pub mod fault;
pub mod handle;
pub mod interceptor;
pub mod layer;
pub mod pattern;

pub use fault::FaultSite;
pub use handle::{Ownership, TracerHandle};
pub use interceptor::TracingInterceptor;
pub use layer::{TracingInterceptorLayer, TracingInterceptorService};
pub use pattern::{PatternError, UrlPattern, UrlPatterns};
