//! Integration tests for the HTTP prober with Wiremock
//!
//! Exercises response classification and full dispatch runs against
//! mock backends.

use lb_probe::{
    DispatchSettings, Dispatcher, HttpProber, ProbeError, ProbeOutcome, Prober, Summarizer,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers as a different backend on each request, cycling in order.
struct RoundRobin {
    nodes: Vec<&'static str>,
    next: AtomicUsize,
}

impl RoundRobin {
    fn new(nodes: Vec<&'static str>) -> Self {
        Self {
            nodes,
            next: AtomicUsize::new(0),
        }
    }
}

impl Respond for RoundRobin {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        let hostname = self.nodes[i % self.nodes.len()];
        ResponseTemplate::new(200).set_body_json(json!({
            "message": "pong",
            "hostname": hostname,
        }))
    }
}

fn prober_for(server: &MockServer, timeout: Duration) -> HttpProber {
    HttpProber::new(format!("{}/api/ping", server.uri()), timeout).unwrap()
}

/// Test a well-formed pong
#[tokio::test]
async fn test_probe_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "pong",
            "hostname": "node-a",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let prober = prober_for(&mock_server, Duration::from_secs(2));
    let resp = prober.probe().await.unwrap();

    assert_eq!(resp.message, "pong");
    assert_eq!(resp.hostname, "node-a");
}

/// Extra fields in the body are ignored
#[tokio::test]
async fn test_probe_ignores_unknown_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "pong",
            "hostname": "node-b",
            "region": "eu-west",
        })))
        .mount(&mock_server)
        .await;

    let resp = prober_for(&mock_server, Duration::from_secs(2))
        .probe()
        .await
        .unwrap();
    assert_eq!(resp.hostname, "node-b");
}

/// Test non-2xx responses
#[tokio::test]
async fn test_probe_bad_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = prober_for(&mock_server, Duration::from_secs(2))
        .probe()
        .await
        .unwrap_err();

    assert_eq!(err, ProbeError::BadStatus(503));
    assert_eq!(err.outcome(), ProbeOutcome::BadStatus);
}

/// Unmatched paths come back as 404
#[tokio::test]
async fn test_probe_not_found() {
    let mock_server = MockServer::start().await;

    let err = prober_for(&mock_server, Duration::from_secs(2))
        .probe()
        .await
        .unwrap_err();
    assert_eq!(err, ProbeError::BadStatus(404));
}

/// Test 200 with a body that is not a pong
#[tokio::test]
async fn test_probe_decode_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let err = prober_for(&mock_server, Duration::from_secs(2))
        .probe()
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Decode(_)), "got {:?}", err);
}

/// JSON missing the hostname field does not decode
#[tokio::test]
async fn test_probe_missing_hostname_is_decode_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "pong" })))
        .mount(&mock_server)
        .await;

    let err = prober_for(&mock_server, Duration::from_secs(2))
        .probe()
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), ProbeOutcome::DecodeFailure);
}

/// A 2xx whose body ends early is a decode failure, not a transport one
#[tokio::test]
async fn test_truncated_body_is_decode_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let backend = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).await.unwrap();
        stream
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 100\r\n\
                  \r\n\
                  {\"message\":\"po",
            )
            .await
            .unwrap();
        stream.shutdown().await.unwrap();
    });

    let prober = HttpProber::new(
        format!("http://{}/api/ping", addr),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = prober.probe().await.unwrap_err();

    assert!(matches!(err, ProbeError::Decode(_)), "got {:?}", err);
    assert_eq!(err.outcome(), ProbeOutcome::DecodeFailure);
    backend.await.unwrap();
}

/// Test slow backend exceeding the client timeout
#[tokio::test]
async fn test_probe_timeout_is_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "pong", "hostname": "node-a" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = prober_for(&mock_server, Duration::from_millis(100))
        .probe()
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Transport(_)), "got {:?}", err);
}

/// Full run against a round-robin backend pool
#[tokio::test]
async fn test_dispatch_round_robin() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(RoundRobin::new(vec!["node-a", "node-b", "node-c"]))
        .expect(30)
        .mount(&mock_server)
        .await;

    let prober = Arc::new(prober_for(&mock_server, Duration::from_secs(2)));
    let settings = DispatchSettings {
        request_count: 30,
        concurrency: 5,
        timeout: Duration::from_secs(2),
    };

    let report = Dispatcher::new(prober, settings).unwrap().run().await.unwrap();
    let summary = report.summarize();

    assert_eq!(summary.total_requests, 30);
    assert_eq!(summary.successful_requests, 30);
    assert_eq!(summary.failed_requests, 0);
    assert_eq!(summary.node_ids, vec!["node-a", "node-b", "node-c"]);
    for node in &summary.nodes {
        assert_eq!(node.requests, 10);
        assert_eq!(node.samples, 10);
    }
    assert!(report.snapshot.is_consistent());
}

/// Mixed outcomes are tallied by kind
#[tokio::test]
async fn test_dispatch_mixed_outcomes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "pong",
            "hostname": "node-a",
        })))
        .up_to_n_times(4)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let prober = Arc::new(prober_for(&mock_server, Duration::from_secs(2)));
    let settings = DispatchSettings {
        request_count: 10,
        concurrency: 1,
        timeout: Duration::from_secs(2),
    };

    let report = Dispatcher::new(prober, settings).unwrap().run().await.unwrap();
    let summary = Summarizer::summarize(&report.snapshot);

    assert_eq!(summary.total_requests, 10);
    assert_eq!(summary.successful_requests, 4);
    assert_eq!(summary.failed_requests, 6);
    assert_eq!(summary.failures.bad_status, 6);
    assert_eq!(summary.requests_per_node.get("node-a"), Some(&4));
    assert_eq!(summary.available_nodes, 1);
}
