//! Agent Relay - OpenAI-compatible streaming front for a hosted agent
//!
//! This library provides the core functionality for the relay server: it
//! turns chat-completion requests into a single agent prompt and streams the
//! agent's text back as OpenAI-style server-sent events.

pub mod agent;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod streaming;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

pub use crate::agent::{AgentConfig, AgentEvent, AgentRunner, OpenAIResponsesRunner};
pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};

/// Application state shared across all request handlers
pub struct AppState {
    /// The agent every request runs against
    pub agent: AgentConfig,
    /// Runtime that executes agent runs
    pub runner: Arc<dyn AgentRunner>,
}

impl AppState {
    /// Create a new application state backed by the OpenAI Responses API
    pub fn new(config: Config) -> Result<Self> {
        // No overall timeout: a generation may legitimately stream for minutes
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_secs(config.upstream_connect_timeout_seconds))
            .build()?;

        let runner: Arc<dyn AgentRunner> =
            Arc::new(OpenAIResponsesRunner::new(http_client, &config));

        Ok(Self::with_runner(config, runner))
    }

    /// Create application state around an existing runner
    pub fn with_runner(config: Config, runner: Arc<dyn AgentRunner>) -> Self {
        Self {
            agent: config.agent,
            runner,
        }
    }
}
