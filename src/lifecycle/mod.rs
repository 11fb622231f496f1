//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Release tracer → Exit
//! ```
//!
//! # Design Decisions
//! - The tracer is released after the server drains, so in-flight spans still close cleanly

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
