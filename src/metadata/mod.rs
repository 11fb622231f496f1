//! Typed request/response metadata.
//!
//! # Data Flow
//! ```text
//! concrete request/response (axum::http, or any other protocol)
//!     → adapter view (http::request / http::response)
//!     → MetadataSource::lookup(KeyId) → MetadataValue
//!     → MetadataExt::try_get(MetadataKey<T>) → Option<T>
//!     → tracer / span record the typed value
//! ```
//!
//! # Design Decisions
//! - Keys carry their value type statically; lookups never cast
//! - Unknown keys and wrong-shaped values both read as absent
//! - Adapters only borrow the transport object and never touch the body

pub mod info;
pub mod keys;

pub use info::{
    HttpRequestInfo, HttpResponseInfo, MetadataExt, MetadataSource, NoResponse, ProtocolMessage,
    ProtocolResponse,
};
pub use keys::{request, response, KeyId, MetadataKey, MetadataType, MetadataValue};
