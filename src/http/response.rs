//! Response view over `axum::http::Response`.
//!
//! # Responsibilities
//! - Answer response metadata keys (status code, body size)
//!
//! # Design Decisions
//! - Content length comes from the header only; streaming bodies are never measured

use axum::http::Response;

use crate::http::content_length;
use crate::metadata::{HttpResponseInfo, KeyId, MetadataSource, MetadataValue, ProtocolResponse};

/// Non-owning view of one outbound response.
pub struct HttpResponseView<'a, B> {
    response: &'a Response<B>,
}

impl<'a, B> HttpResponseView<'a, B> {
    /// Borrow a response for metadata lookups.
    pub fn new(response: &'a Response<B>) -> Self {
        Self { response }
    }
}

impl<B> MetadataSource for HttpResponseView<'_, B> {
    fn lookup(&self, key: KeyId) -> Option<MetadataValue> {
        match key {
            KeyId::StatusCode => Some(MetadataValue::U16(self.response.status().as_u16())),
            KeyId::ContentLength => content_length(self.response.headers()).map(MetadataValue::U64),
            _ => None,
        }
    }
}

impl<B> HttpResponseInfo for HttpResponseView<'_, B> {}

impl<B> ProtocolResponse for Response<B> {
    fn http_response(&self) -> Option<Box<dyn HttpResponseInfo + '_>> {
        Some(Box::new(HttpResponseView::new(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{response, MetadataExt};
    use axum::body::Body;

    fn build(status: u16, content_length: Option<&str>) -> Response<Body> {
        let mut builder = Response::builder().status(status);
        if let Some(len) = content_length {
            builder = builder.header("Content-Length", len);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_status_code() {
        let res = build(404, None);
        assert_eq!(HttpResponseView::new(&res).try_get(response::STATUS_CODE), Some(404));
    }

    #[test]
    fn test_content_length() {
        let res = build(200, Some("123"));
        assert_eq!(HttpResponseView::new(&res).try_get(response::CONTENT_LENGTH), Some(123));
    }

    #[test]
    fn test_content_length_missing_or_invalid() {
        let missing = build(200, None);
        assert_eq!(HttpResponseView::new(&missing).try_get(response::CONTENT_LENGTH), None);

        for bad in ["abc", "12x", "-5", "0x1F", ""] {
            let res = build(200, Some(bad));
            assert_eq!(
                HttpResponseView::new(&res).try_get(response::CONTENT_LENGTH),
                None,
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_unknown_key_is_absent() {
        let res = build(200, None);
        assert_eq!(HttpResponseView::new(&res).lookup(KeyId::Method), None);
    }
}
