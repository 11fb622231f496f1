//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the demo handlers
//! - Wire up middleware (timeout, tracing interceptor)
//! - Serve until shutdown, then release the tracer

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::config::AppConfig;
use crate::filter::{PatternError, TracerHandle, TracingInterceptor, TracingInterceptorLayer};

/// HTTP server whose every request passes through the tracing interceptor.
pub struct HttpServer {
    router: Router,
    interceptor: Arc<TracingInterceptor>,
}

impl HttpServer {
    /// Build the router and interceptor from config.
    pub fn new(config: &AppConfig, tracer: TracerHandle) -> Result<Self, PatternError> {
        let interceptor = Arc::new(TracingInterceptor::new(tracer, &config.filter)?);
        let router = Self::build_router(config, interceptor.clone());
        Ok(Self { router, interceptor })
    }

    /// The interceptor goes on last so it wraps the timeout as well.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, interceptor: Arc<TracingInterceptor>) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/echo", post(echo_handler))
            .route("/status/{code}", get(status_handler))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TracingInterceptorLayer::from_shared(interceptor))
    }

    /// Serve until `shutdown` fires, then release the tracer if owned.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await;

        if self.interceptor.destroy() {
            tracing::info!("Tracer released");
        }
        tracing::info!("HTTP server stopped");
        served
    }
}

async fn root_handler() -> &'static str {
    "ok"
}

async fn echo_handler(body: Bytes) -> Bytes {
    body
}

async fn status_handler(Path(code): Path<u16>) -> impl IntoResponse {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, status.canonical_reason().unwrap_or_default().to_string()),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status code {}", code)),
    }
}
