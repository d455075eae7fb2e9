//! OpenAI Responses API runner
//!
//! Runs an agent by posting its instructions and the prompt to
//! `{base}/responses` with `stream: true`, then decoding the SSE body into
//! [`AgentEvent`]s.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use super::{AgentConfig, AgentEvent, AgentEventStream, AgentRunner, ResponseStreamEvent};
use crate::{
    config::Config,
    error::{AppError, AppResult},
    streaming::{SseDecoder, SseFrame},
};

/// Request body for a streamed Responses API call
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    stream: bool,
}

/// Agent runner backed by the OpenAI Responses API
pub struct OpenAIResponsesRunner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAIResponsesRunner {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
        }
    }

    fn build_headers(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid API key format: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        Ok(headers)
    }
}

#[async_trait]
impl AgentRunner for OpenAIResponsesRunner {
    fn name(&self) -> &'static str {
        "openai-responses"
    }

    #[instrument(skip(self, agent, input), fields(agent = %agent.name, model = %agent.model))]
    async fn run_streamed(&self, agent: &AgentConfig, input: &str) -> AppResult<AgentEventStream> {
        let url = format!("{}/responses", self.base_url);
        let body = ResponsesRequest {
            model: &agent.model,
            instructions: &agent.instructions,
            input,
            stream: true,
        };

        debug!(url = %url, input_len = input.len(), "Starting agent run");

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to reach agent runtime");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(upstream_error_message(status, &text)));
        }

        info!(url = %url, status = %status, "Agent run started");

        let agent_name = agent.name.clone();
        let mut bytes = response.bytes_stream();

        Ok(Box::pin(async_stream::try_stream! {
            yield AgentEvent::AgentUpdated { name: agent_name };

            let mut decoder = SseDecoder::new();
            let mut finished = false;
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(AppError::Http)?;
                for frame in decoder.feed(&chunk) {
                    for event in frame_to_events(&frame)? {
                        finished |= event.ends_run();
                        yield event;
                    }
                }
            }

            if decoder.has_incomplete() {
                warn!(finished, "Agent runtime body ended mid-frame");
                if let Some(frame) = decoder.finish() {
                    for event in frame_to_events(&frame)? {
                        finished |= event.ends_run();
                        yield event;
                    }
                }
            }

            if !finished {
                Err::<(), _>(AppError::Upstream(
                    "Agent run ended before completion".to_string(),
                ))?;
            }
        }))
    }
}

/// Map one SSE frame to the events it represents.
///
/// Failure events end the run with an error. Frames that are not JSON are
/// skipped. The caller treats a body that ends before `response.completed`
/// or `response.incomplete` as a failed run.
fn frame_to_events(frame: &SseFrame) -> AppResult<Vec<AgentEvent>> {
    let data = frame.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(Vec::new());
    }

    let event: ResponseStreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            warn!(event = ?frame.event, error = %e, "Skipping unparsable stream frame");
            return Ok(Vec::new());
        }
    };

    match event {
        ResponseStreamEvent::Failed { response } => {
            let message = response["error"]["message"]
                .as_str()
                .unwrap_or("Agent run failed")
                .to_string();
            Err(AppError::Upstream(message))
        }
        ResponseStreamEvent::Error { message, code } => Err(AppError::Upstream(match code {
            Some(code) => format!("{} ({})", message, code),
            None => message,
        })),
        ResponseStreamEvent::OutputItemDone { item } => {
            let is_message = item["type"] == "message";
            let mut events = vec![AgentEvent::Raw(ResponseStreamEvent::OutputItemDone { item })];
            if is_message {
                events.push(AgentEvent::RunItem {
                    name: "message_output_created".to_string(),
                });
            }
            Ok(events)
        }
        other => Ok(vec![AgentEvent::Raw(other)]),
    }
}

/// Build a readable message from a non-success Responses API reply.
fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        format!("Agent runtime returned {}", status)
    } else {
        format!("Agent runtime returned {}: {}", status, detail)
    }
}
