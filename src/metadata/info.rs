//! Read-only request/response views.

use super::keys::{KeyId, MetadataKey, MetadataType, MetadataValue};

/// The single capability every view implements: answer a key, or don't.
pub trait MetadataSource {
    /// Raw answer for `key`. Unrecognized keys return `None`.
    fn lookup(&self, key: KeyId) -> Option<MetadataValue>;
}

/// Typed access on top of [`MetadataSource`].
pub trait MetadataExt: MetadataSource {
    /// Value of `key`, typed as the key declares, or `None` when absent.
    fn try_get<T: MetadataType>(&self, key: MetadataKey<T>) -> Option<T> {
        key.extract(self.lookup(key.id()))
    }
}

impl<S: MetadataSource + ?Sized> MetadataExt for S {}

/// View over an inbound HTTP request.
pub trait HttpRequestInfo: MetadataSource {
    /// Raw header value, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;
}

/// View over an outbound HTTP response.
pub trait HttpResponseInfo: MetadataSource {}

/// A message the interceptor may receive.
///
/// Implementations return `None` for anything that is not an HTTP request;
/// such messages bypass tracing entirely.
pub trait ProtocolMessage {
    fn http_request(&self) -> Option<Box<dyn HttpRequestInfo + '_>>;
}

/// A value produced by the wrapped application logic.
pub trait ProtocolResponse {
    fn http_response(&self) -> Option<Box<dyn HttpResponseInfo + '_>>;
}

/// Response view used when the application produced no response value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResponse;

impl MetadataSource for NoResponse {
    fn lookup(&self, _key: KeyId) -> Option<MetadataValue> {
        None
    }
}

impl HttpResponseInfo for NoResponse {}
