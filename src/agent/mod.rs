//! Agent runtime abstraction
//!
//! An agent is a fixed (name, instructions, model) triple. Running it against
//! a prompt produces a stream of [`AgentEvent`]s; only the raw text deltas
//! inside that stream end up on the wire.

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Deserialize;

use crate::error::AppResult;

pub use openai::OpenAIResponsesRunner;

/// Immutable agent definition, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub name: String,
    pub instructions: String,
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Coder".to_string(),
            instructions: "You are a helpful coding assistant. Explain code clearly.".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Events produced while an agent run is streaming.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The agent handling the run changed (always emitted first)
    AgentUpdated { name: String },
    /// A raw event from the model's response stream
    Raw(ResponseStreamEvent),
    /// A higher-level item was produced by the run
    RunItem { name: String },
}

impl AgentEvent {
    /// The text carried by this event, if it is a raw token delta.
    pub fn text_delta(&self) -> Option<&str> {
        match self {
            AgentEvent::Raw(ResponseStreamEvent::OutputTextDelta { delta, .. }) => Some(delta),
            _ => None,
        }
    }

    /// Whether this event means the upstream run has finished.
    pub fn ends_run(&self) -> bool {
        matches!(
            self,
            AgentEvent::Raw(ResponseStreamEvent::Completed { .. })
                | AgentEvent::Raw(ResponseStreamEvent::Incomplete { .. })
        )
    }
}

/// The subset of Responses API stream events the relay understands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseStreamEvent {
    #[serde(rename = "response.created")]
    Created {
        #[serde(default)]
        response: serde_json::Value,
    },

    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        delta: String,
        #[serde(default)]
        item_id: Option<String>,
        #[serde(default)]
        output_index: u32,
        #[serde(default)]
        content_index: u32,
    },

    #[serde(rename = "response.output_item.done")]
    OutputItemDone {
        #[serde(default)]
        item: serde_json::Value,
    },

    #[serde(rename = "response.completed")]
    Completed {
        #[serde(default)]
        response: serde_json::Value,
    },

    /// Run stopped early, e.g. on `max_output_tokens`; the text so far stands
    #[serde(rename = "response.incomplete")]
    Incomplete {
        #[serde(default)]
        response: serde_json::Value,
    },

    #[serde(rename = "response.failed")]
    Failed {
        #[serde(default)]
        response: serde_json::Value,
    },

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
        #[serde(default)]
        code: Option<String>,
    },

    #[serde(other)]
    Other,
}

/// Stream of events for one agent run
pub type AgentEventStream = Pin<Box<dyn Stream<Item = AppResult<AgentEvent>> + Send>>;

/// Something that can run an agent against a prompt and stream the result.
///
/// Errors returned from `run_streamed` itself happen before any output is
/// produced; errors inside the stream happen mid-run.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Runner name for logging
    fn name(&self) -> &'static str;

    /// Start a streaming run of `agent` with `input` as the user prompt.
    async fn run_streamed(&self, agent: &AgentConfig, input: &str) -> AppResult<AgentEventStream>;
}
