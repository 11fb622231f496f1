//! Tower integration.
//!
//! Apply to an axum router with `.layer(TracingInterceptorLayer::new(interceptor))`.
//! Add it last so it is the outermost layer and observes everything beneath it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::{Layer, Service};

use crate::filter::interceptor::TracingInterceptor;
use crate::metadata::{ProtocolMessage, ProtocolResponse};
use crate::tracer::ApplicationError;

/// Tower layer wrapping services with a [`TracingInterceptor`].
#[derive(Clone)]
pub struct TracingInterceptorLayer {
    interceptor: Arc<TracingInterceptor>,
}

impl TracingInterceptorLayer {
    /// Wrap services with `interceptor`.
    pub fn new(interceptor: TracingInterceptor) -> Self {
        Self {
            interceptor: Arc::new(interceptor),
        }
    }

    /// Share one interceptor with its owner, which destroys it on shutdown.
    pub fn from_shared(interceptor: Arc<TracingInterceptor>) -> Self {
        Self { interceptor }
    }
}

impl<S> Layer<S> for TracingInterceptorLayer {
    type Service = TracingInterceptorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingInterceptorService {
            inner,
            interceptor: self.interceptor.clone(),
        }
    }
}

/// Tower service that runs every call through the interceptor.
#[derive(Clone)]
pub struct TracingInterceptorService<S> {
    inner: S,
    interceptor: Arc<TracingInterceptor>,
}

impl<S, M> Service<M> for TracingInterceptorService<S>
where
    M: ProtocolMessage + Send + 'static,
    S: Service<M> + Clone + Send + 'static,
    S::Response: ProtocolResponse + Send + 'static,
    S::Error: ApplicationError + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, message: M) -> Self::Future {
        // Keep the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let interceptor = self.interceptor.clone();

        Box::pin(async move {
            interceptor
                .intercept(message, move |message| inner.call(message))
                .await
        })
    }
}
