//! End-to-end protocol tests: task initiation plus event streaming against
//! a mock engine.

use base64::Engine;
use futures::StreamExt;
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use scistream_sdk::{
    ClientConfig, EventStream, SciStreamClient, StreamEvent, TaskRequest, TaskStatus,
};
use std::time::Duration;

fn sse_body(events: &[&str]) -> String {
    events
        .iter()
        .map(|event| format!("data: {event}\n\n"))
        .collect()
}

async fn collect(events: EventStream) -> Vec<StreamEvent> {
    events.collect().await
}

#[tokio::test]
async fn test_chat_yields_events_until_completed() {
    let mut server = Server::new_async().await;
    let _start = server
        .mock("POST", "/chat/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "user_id": "u1",
            "session_id": "c1",
            "content": "hello",
        })))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(r#"{"task_id":"t-1"}"#)
        .create_async()
        .await;
    let _stream = server
        .mock("GET", "/stream/t-1")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&[
            r#"{"status":"running","message":"working"}"#,
            r#"{"status":"completed","result":{"response":"hi"}}"#,
        ]))
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();
    let events = client
        .chat(TaskRequest::new("u1", "c1").content("hello"))
        .await
        .unwrap();
    let events = collect(events).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].status, TaskStatus::Running);
    assert_eq!(events[0].message.as_deref(), Some("working"));
    assert_eq!(events[1].status, TaskStatus::Completed);
    assert_eq!(events[1].final_result().unwrap()["response"], "hi");
}

#[tokio::test]
async fn test_research_and_hypotheses_hit_their_endpoints() {
    let mut server = Server::new_async().await;
    let research = server
        .mock("POST", "/research/")
        .with_status(202)
        .with_body(r#"{"task_id":"t-r"}"#)
        .create_async()
        .await;
    let hypotheses = server
        .mock("POST", "/hypotheses/")
        .with_status(202)
        .with_body(r#"{"task_id":"t-h"}"#)
        .create_async()
        .await;
    let _stream_r = server
        .mock("GET", "/stream/t-r")
        .with_body(sse_body(&[r#"{"status":"completed"}"#]))
        .create_async()
        .await;
    let _stream_h = server
        .mock("GET", "/stream/t-h")
        .with_body(sse_body(&[r#"{"status":"completed"}"#]))
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();

    let events = collect(
        client
            .research(TaskRequest::new("u1", "c1").content("topic"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Completed);

    let events = collect(
        client
            .hypotheses(TaskRequest::new("u1", "c1").content("topic"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Completed);

    research.assert_async().await;
    hypotheses.assert_async().await;
}

#[tokio::test]
async fn test_initiation_500_yields_single_error_event() {
    let mut server = Server::new_async().await;
    let _start = server
        .mock("POST", "/chat/")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();
    let events = collect(
        client
            .chat(TaskRequest::new("u1", "c1").content("hello"))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Error);
    let message = events[0].message.as_deref().unwrap();
    assert!(message.contains("500"), "message was: {message}");
    assert!(message.contains("failed to start task"));
}

#[tokio::test]
async fn test_plain_200_is_not_acceptance() {
    let mut server = Server::new_async().await;
    let _start = server
        .mock("POST", "/chat/")
        .with_status(200)
        .with_body(r#"{"task_id":"t-1"}"#)
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();
    let events = collect(client.chat(TaskRequest::new("u1", "c1")).await.unwrap()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Error);
    assert!(events[0].message.as_deref().unwrap().contains("200"));
}

#[tokio::test]
async fn test_accepted_without_task_id_yields_single_error_event() {
    let mut server = Server::new_async().await;
    let _start = server
        .mock("POST", "/chat/")
        .with_status(202)
        .with_body("{}")
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();
    let events = collect(client.chat(TaskRequest::new("u1", "c1")).await.unwrap()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Error);
    assert!(events[0].message.as_deref().unwrap().contains("no task_id"));
}

#[tokio::test]
async fn test_accepted_with_empty_task_id_yields_single_error_event() {
    let mut server = Server::new_async().await;
    let _start = server
        .mock("POST", "/chat/")
        .with_status(202)
        .with_body(r#"{"task_id":""}"#)
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();
    let events = collect(client.chat(TaskRequest::new("u1", "c1")).await.unwrap()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Error);
    assert!(events[0].message.as_deref().unwrap().contains("no task_id"));
}

#[tokio::test]
async fn test_unreachable_engine_yields_single_error_event() {
    // Discard port: nothing listens there.
    let config = ClientConfig::new("http://127.0.0.1:9").request_timeout(Duration::from_secs(5));
    let client = SciStreamClient::new(config).unwrap();
    let events = collect(client.chat(TaskRequest::new("u1", "c1")).await.unwrap()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Error);
    assert!(events[0]
        .message
        .as_deref()
        .unwrap()
        .contains("failed to start task"));
}

#[tokio::test]
async fn test_file_attachment_travels_encoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    std::fs::write(&path, b"hi").unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"hi");

    let mut server = Server::new_async().await;
    let start = server
        .mock("POST", "/chat/")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "files": [{
                "filename": "note.txt",
                "content_type": "text/plain",
                "base64": encoded,
            }],
        })))
        .with_status(202)
        .with_body(r#"{"task_id":"t-1"}"#)
        .create_async()
        .await;
    let _stream = server
        .mock("GET", "/stream/t-1")
        .with_body(sse_body(&[r#"{"status":"completed"}"#]))
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();
    let events = collect(
        client
            .chat(TaskRequest::new("u1", "c1").file(path))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Completed);
    start.assert_async().await;
}

#[tokio::test]
async fn test_unpolled_stream_sends_nothing() {
    let mut server = Server::new_async().await;
    let start = server
        .mock("POST", "/chat/")
        .with_status(202)
        .with_body(r#"{"task_id":"t-1"}"#)
        .create_async()
        .await;

    let client = SciStreamClient::new(ClientConfig::new(server.url())).unwrap();
    let events = client.chat(TaskRequest::new("u1", "c1")).await.unwrap();
    drop(events);

    assert!(!start.matched_async().await);
}
