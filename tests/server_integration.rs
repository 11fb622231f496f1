//! End-to-end tests against a live server.

use std::net::SocketAddr;

use failsafe_tracing::config::AppConfig;
use failsafe_tracing::filter::TracerHandle;
use failsafe_tracing::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

mod common;

use common::{Fault, FaultPlan, RecordingTracer, SpanEvent};

struct RunningServer {
    addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    async fn start(config: AppConfig, tracer: TracerHandle) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HttpServer::new(&config, tracer).unwrap();
        let shutdown = Shutdown::new();
        let task = tokio::spawn(server.run(listener, shutdown.subscribe()));
        Self { addr, shutdown, task }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        self.shutdown.trigger();
        self.task.await.unwrap().unwrap();
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_live_requests_are_traced() {
    let tracer = RecordingTracer::healthy();
    let server = RunningServer::start(AppConfig::default(), TracerHandle::owned(tracer.clone())).await;
    let client = client();

    let res = client.get(server.url("/status/404")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "Not Found");

    let res = client
        .post(server.url("/echo"))
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "hello");

    let events = tracer.events();
    assert!(events.contains(&SpanEvent::Opened { path: Some("/status/404".into()) }));
    assert!(events.contains(&SpanEvent::Opened { path: Some("/echo".into()) }));
    assert_eq!(
        tracer.count(|e| matches!(e, SpanEvent::Response { status: Some(404), .. })),
        1
    );
    assert_eq!(tracer.opened(), 2);
    assert_eq!(tracer.closed(), 2);

    server.stop().await;
    assert_eq!(tracer.tracer_closes(), 1);
}

#[tokio::test]
async fn test_failing_tracer_never_reaches_client() {
    for fault in [Fault::Error, Fault::Panic] {
        let tracer = RecordingTracer::new(FaultPlan::everywhere(fault));
        let server = RunningServer::start(AppConfig::default(), TracerHandle::owned(tracer)).await;

        let res = client().get(server.url("/")).send().await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.text().await.unwrap(), "ok");

        server.stop().await;
    }
}

#[tokio::test]
async fn test_url_patterns_limit_tracing() {
    let mut config = AppConfig::default();
    config.filter.url_patterns = vec!["/status/*".into()];
    let tracer = RecordingTracer::healthy();
    let server = RunningServer::start(config, TracerHandle::owned(tracer.clone())).await;
    let client = client();

    client.get(server.url("/")).send().await.unwrap();
    client.get(server.url("/status/201")).send().await.unwrap();

    assert_eq!(
        tracer.events().first(),
        Some(&SpanEvent::Opened { path: Some("/status/201".into()) })
    );
    assert_eq!(tracer.opened(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_shared_tracer_left_open_on_shutdown() {
    let tracer = RecordingTracer::healthy();
    let server = RunningServer::start(AppConfig::default(), TracerHandle::shared(tracer.clone())).await;

    client().get(server.url("/")).send().await.unwrap();
    server.stop().await;

    assert_eq!(tracer.opened(), 1);
    assert_eq!(tracer.tracer_closes(), 0);
}

#[tokio::test]
async fn test_disabled_filter_traces_nothing() {
    let mut config = AppConfig::default();
    config.filter.enabled = false;
    let tracer = RecordingTracer::healthy();
    let server = RunningServer::start(config, TracerHandle::owned(tracer.clone())).await;

    let res = client().get(server.url("/status/503")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    assert_eq!(tracer.opened(), 0);

    server.stop().await;
}
