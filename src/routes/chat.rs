//! Chat completions endpoint
//!
//! Accepts an OpenAI-style chat request, flattens the conversation into one
//! prompt, runs the configured agent and streams its text back as
//! OpenAI-compatible chunks.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};

use crate::{
    error::{AppError, AppResult},
    logging::RequestContext,
    routes::metrics::record_request,
    streaming::StreamTranslator,
    AppState,
};

/// Header the Vercel AI SDK uses to recognise a data stream
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

fn default_stream() -> bool {
    true
}

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_stream")]
    pub stream: bool,
}

/// Render the user and assistant turns as `role: content` lines, in order.
///
/// System messages and unknown roles are dropped.
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.role == "user" || m.role == "assistant")
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Content of the most recent user message, if it has any.
pub fn last_user_message(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .filter(|content| !content.is_empty())
}

/// Parse a chat request body.
pub fn parse_request(body: &[u8]) -> AppResult<ChatRequest> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))
}

/// Handle chat completion requests
pub async fn chat_completions(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let context = RequestContext::new(state.runner.name(), "/chat/completions");
    let span = context.create_span();

    match stream_chat(state, &body, context.clone()).instrument(span).await {
        Ok(response) => {
            record_request("streaming", context.elapsed_secs());
            response
        }
        Err(err) => {
            record_request(err.kind(), context.elapsed_secs());
            if err.status().is_client_error() {
                context.log_rejected(&err);
            }
            err.into_response()
        }
    }
}

async fn stream_chat(
    state: Arc<AppState>,
    body: &[u8],
    context: RequestContext,
) -> AppResult<Response> {
    let request = parse_request(body)?;
    let context = context
        .with_model(request.model.clone())
        .with_message_count(request.messages.len());
    context.log_request_start();

    if !request.stream {
        debug!(trace_id = %context.trace_id, "Client asked for stream=false, streaming anyway");
    }

    let last_user = last_user_message(&request.messages)
        .ok_or_else(|| AppError::Validation("No user message found".to_string()))?;
    context.log_user_prompt(last_user);

    let prompt = build_prompt(&request.messages);
    let events = state.runner.run_streamed(&state.agent, &prompt).await?;

    let body = Body::from_stream(StreamTranslator::new(events, context).into_stream());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(DATA_STREAM_HEADER, "v1")
        .body(body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
