//! End-to-end shipping: shell output -> OutputSink -> LokiShipper -> mock Loki

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use hooktail_core::application::{shutdown_channel, ExecutionRegistry, HookService, OutputSink};
use hooktail_core::domain::{HookDefinition, LabelSet};
use hooktail_core::port::SystemTimeProvider;
use hooktail_infra_loki::{LokiConfig, LokiShipper};
use hooktail_infra_system::ShellCommandRunner;

async fn loki() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/loki/api/v1/push"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    server
}

/// Every (labels, line) pair pushed so far, in arrival order
async fn pushed_lines(server: &MockServer) -> Vec<(Value, String)> {
    let requests: Vec<Request> = server.received_requests().await.unwrap_or_default();
    let mut out = Vec::new();
    for request in requests {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        for stream in body["streams"].as_array().unwrap() {
            for value in stream["values"].as_array().unwrap() {
                out.push((stream["stream"].clone(), value[1].as_str().unwrap().to_string()));
            }
        }
    }
    out
}

async fn wait_for_lines(server: &MockServer, n: usize) -> Vec<(Value, String)> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let lines = pushed_lines(server).await;
        if lines.len() >= n || Instant::now() > deadline {
            return lines;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_command_output_reaches_loki_with_labels() {
    let server = loki().await;
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let config = LokiConfig {
        batch_wait: Duration::from_millis(100),
        ..LokiConfig::new(server.uri())
    };
    let (shipper, shipper_handle) = LokiShipper::spawn(config, shutdown_rx).unwrap();

    let time = Arc::new(SystemTimeProvider);
    let registry = Arc::new(ExecutionRegistry::new(100, time.clone()));
    let sink = OutputSink::new(Arc::clone(&registry)).with_shipper(
        Arc::new(shipper),
        LabelSet::from_map([("job", "hooktail")]).unwrap(),
        time,
    );
    let service = HookService::new(
        vec![HookDefinition::new("deploy", "printf 'first\\nsecond\\n'", "/tmp")],
        registry,
        Arc::new(sink),
        Arc::new(ShellCommandRunner::default()),
    );

    service.trigger("deploy").unwrap().wait().await.unwrap();

    let lines = wait_for_lines(&server, 3).await;
    let texts: Vec<&str> = lines.iter().map(|(_, line)| line.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "Command finished successfully"]);

    for (labels, _) in &lines {
        assert_eq!(labels["job"], "hooktail");
        assert_eq!(labels["hook_id"], "deploy");
    }

    // Tail and shipping see the same lines
    assert_eq!(service.tail("deploy").unwrap().lines, texts);

    shutdown_tx.shutdown();
    tokio::time::timeout(Duration::from_secs(5), shipper_handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_hooks_are_shipped_as_separate_streams() {
    let server = loki().await;
    let (_shutdown_tx, shutdown_rx) = shutdown_channel();

    let config = LokiConfig {
        batch_size: 2,
        batch_wait: Duration::from_secs(3600),
        ..LokiConfig::new(server.uri())
    };
    let (shipper, _handle) = LokiShipper::spawn(config, shutdown_rx).unwrap();

    let time = Arc::new(SystemTimeProvider);
    let registry = Arc::new(ExecutionRegistry::new(100, time.clone()));
    let sink = OutputSink::new(Arc::clone(&registry)).with_shipper(
        Arc::new(shipper),
        LabelSet::default(),
        time,
    );
    let service = HookService::new(
        vec![
            HookDefinition::new("a", "echo from-a", "/tmp"),
            HookDefinition::new("b", "echo from-b", "/tmp"),
        ],
        registry,
        Arc::new(sink),
        Arc::new(ShellCommandRunner::default()),
    );

    // Two distinct label sets fill the batch, so no timer is needed
    service.trigger("a").unwrap().wait().await.unwrap();
    service.trigger("b").unwrap().wait().await.unwrap();

    let lines = wait_for_lines(&server, 3).await;
    assert!(lines.len() >= 3);
    assert!(lines
        .iter()
        .any(|(labels, line)| labels["hook_id"] == "a" && line == "from-a"));
    assert!(lines
        .iter()
        .any(|(labels, line)| labels["hook_id"] == "b" && line == "from-b"));
}
