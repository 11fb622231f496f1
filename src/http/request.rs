//! Request view over `axum::http::Request`.
//!
//! # Responsibilities
//! - Answer request metadata keys (method, host, path, user agent, client address, body size)
//! - Expose raw header lookup for trace-context propagation
//!
//! # Design Decisions
//! - Borrows the request immutably; the body and its decoding state are never touched
//! - Client address prefers the first `X-Forwarded-For` hop over the socket peer

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{header, Request};

use crate::http::content_length;
use crate::metadata::{HttpRequestInfo, KeyId, MetadataSource, MetadataValue, ProtocolMessage};

/// Non-owning view of one inbound request.
pub struct HttpRequestView<'a, B> {
    request: &'a Request<B>,
}

impl<'a, B> HttpRequestView<'a, B> {
    /// Borrow a request for metadata lookups.
    pub fn new(request: &'a Request<B>) -> Self {
        Self { request }
    }

    fn host(&self) -> Option<String> {
        self.header(header::HOST.as_str())
            .map(str::to_string)
            .or_else(|| self.request.uri().host().map(str::to_string))
    }

    fn remote_addr(&self) -> Option<IpAddr> {
        let forwarded = self
            .header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .and_then(|hop| hop.trim().parse::<IpAddr>().ok());

        forwarded.or_else(|| {
            self.request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
    }
}

impl<B> MetadataSource for HttpRequestView<'_, B> {
    fn lookup(&self, key: KeyId) -> Option<MetadataValue> {
        match key {
            KeyId::Method => Some(MetadataValue::Text(self.request.method().as_str().to_string())),
            KeyId::Host => self.host().map(MetadataValue::Text),
            KeyId::Path => Some(MetadataValue::Text(self.request.uri().path().to_string())),
            KeyId::UserAgent => self
                .header(header::USER_AGENT.as_str())
                .map(|ua| MetadataValue::Text(ua.to_string())),
            KeyId::RemoteAddr => self.remote_addr().map(MetadataValue::Ip),
            KeyId::ContentLength => content_length(self.request.headers()).map(MetadataValue::U64),
            _ => None,
        }
    }
}

impl<B> HttpRequestInfo for HttpRequestView<'_, B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

impl<B> ProtocolMessage for Request<B> {
    fn http_request(&self) -> Option<Box<dyn HttpRequestInfo + '_>> {
        Some(Box::new(HttpRequestView::new(self)))
    }
}
