//! HTTP adapters and the bundled server.
//!
//! # Data Flow
//! ```text
//! axum::http::Request<B>
//!     → request.rs (HttpRequestView: metadata for the tracer)
//!     → application
//!     → response.rs (HttpResponseView: metadata for the span)
//! server.rs wires an axum app behind the interceptor layer.
//! ```

pub mod request;
pub mod response;
pub mod server;

use axum::http::{header, HeaderMap};

pub use request::HttpRequestView;
pub use response::HttpResponseView;
pub use server::HttpServer;

/// `Content-Length` as a base-10 integer; `None` when missing or malformed.
pub(crate) fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
}
