//! Chat completions endpoint integration tests
//!
//! - POST /chat/completions with a scripted agent runtime
//! - Request validation (no user message, malformed body)
//! - Streaming response format and failure policy

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{chunk_content, server_with_runner, sse_events, test_data, ScriptedRunner, Step};

#[tokio::test]
async fn test_streams_each_delta_then_done() {
    let runner = Arc::new(ScriptedRunner::new(vec![
        Step::delta("Hello"),
        Step::delta(", "),
        Step::delta("world"),
    ]));
    let server = server_with_runner(runner);

    let response = server
        .post("/chat/completions")
        .json(&test_data::single_user_request())
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "text/event-stream");
    assert_eq!(response.header("x-vercel-ai-data-stream"), "v1");

    let events = sse_events(&response.text());
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[..3].iter().map(|e| chunk_content(e)).collect::<Vec<_>>(),
        vec!["Hello", ", ", "world"]
    );
    assert_eq!(events[3], "data: [DONE]\n\n");
}

#[tokio::test]
async fn test_chunk_json_shape() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![Step::delta("x")])));

    let response = server
        .post("/chat/completions")
        .json(&test_data::single_user_request())
        .await;

    let events = sse_events(&response.text());
    let json = events[0]
        .strip_prefix("data: ")
        .and_then(|rest| rest.strip_suffix("\n\n"))
        .unwrap();
    let chunk: Value = serde_json::from_str(json).unwrap();
    assert_eq!(
        chunk,
        json!({ "choices": [{ "delta": { "content": "x" }, "index": 0 }] })
    );
}

#[tokio::test]
async fn test_non_delta_events_produce_no_lines() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![
        Step::noise(),
        Step::delta("a"),
        Step::noise(),
        Step::noise(),
        Step::delta("b"),
        Step::noise(),
    ])));

    let response = server
        .post("/chat/completions")
        .json(&test_data::single_user_request())
        .await;

    let events = sse_events(&response.text());
    assert_eq!(events.len(), 3);
    assert_eq!(chunk_content(&events[0]), "a");
    assert_eq!(chunk_content(&events[1]), "b");
    assert_eq!(events[2], "data: [DONE]\n\n");
}

#[tokio::test]
async fn test_run_without_deltas_still_ends_with_done() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![Step::noise()])));

    let response = server
        .post("/chat/completions")
        .json(&test_data::single_user_request())
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "data: [DONE]\n\n");
}

#[tokio::test]
async fn test_prompt_is_flattened_conversation() {
    let runner = Arc::new(ScriptedRunner::new(vec![Step::delta("ok")]));
    let server = server_with_runner(runner.clone());

    server
        .post("/chat/completions")
        .json(&test_data::conversation_request())
        .await
        .assert_status_ok();

    assert_eq!(
        runner.prompts(),
        vec!["user: What is a borrow?\nassistant: A reference.\nuser: Explain more.".to_string()]
    );
}

#[tokio::test]
async fn test_no_user_message_is_bad_request() {
    let runner = Arc::new(ScriptedRunner::new(vec![Step::delta("unused")]));
    let server = server_with_runner(runner.clone());

    let response = server
        .post("/chat/completions")
        .json(&test_data::no_user_request())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "No user message found" })
    );
    assert!(runner.prompts().is_empty());
}

#[tokio::test]
async fn test_empty_message_list_is_bad_request() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![])));

    let response = server
        .post("/chat/completions")
        .json(&json!({ "model": "gpt-4o-mini", "messages": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["detail"], "No user message found");
}

#[tokio::test]
async fn test_malformed_body_is_unprocessable() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![])));

    let response = server.post("/chat/completions").text("{not json").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["detail"].is_string());
}

#[tokio::test]
async fn test_missing_model_is_unprocessable() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![])));

    let response = server
        .post("/chat/completions")
        .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_runtime_failure_before_stream_is_server_error() {
    let server = server_with_runner(Arc::new(ScriptedRunner::failing_to_start(
        "Agent runtime returned 401 Unauthorized: bad key",
    )));

    let response = server
        .post("/chat/completions")
        .json(&test_data::single_user_request())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Agent runtime returned 401 Unauthorized: bad key" })
    );
}

#[tokio::test]
async fn test_runtime_failure_mid_stream_ends_without_done() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![
        Step::delta("partial "),
        Step::delta("answer"),
        Step::Fail("connection reset by peer".to_string()),
        Step::delta("never forwarded"),
    ])));

    let response = server
        .post("/chat/completions")
        .json(&test_data::single_user_request())
        .await;

    // headers were already sent, so the status stays 200
    response.assert_status_ok();

    let events = sse_events(&response.text());
    assert_eq!(events.len(), 3);
    assert_eq!(chunk_content(&events[0]), "partial ");
    assert_eq!(chunk_content(&events[1]), "answer");
    assert_eq!(
        events[2],
        "data: {\"error\":{\"message\":\"connection reset by peer\",\"type\":\"stream_error\"}}\n\n"
    );
    assert!(!response.text().contains("[DONE]"));
}

#[tokio::test]
async fn test_stream_false_is_still_streamed() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![Step::delta("hi")])));

    let response = server
        .post("/chat/completions")
        .json(&json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "hi" }],
            "stream": false
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "text/event-stream");
    assert!(response.text().ends_with("data: [DONE]\n\n"));
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let server = server_with_runner(Arc::new(ScriptedRunner::new(vec![])));

    let response = server.get("/chat/completions").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
