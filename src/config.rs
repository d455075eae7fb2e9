//! Configuration management for the relay
//!
//! Configuration is loaded from environment variables (after `.env` is read
//! by `dotenvy` in `main`).

use anyhow::{bail, Context, Result};
use std::env;

use crate::agent::AgentConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// OpenAI API URL (Responses API base)
    pub openai_api_url: String,
    /// OpenAI API key
    pub openai_api_key: String,

    /// Connect timeout for the upstream agent runtime (in seconds)
    pub upstream_connect_timeout_seconds: u64,

    /// The agent every request is run against
    pub agent: AgentConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map instead so
    /// they never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let openai_api_key = match lookup("OPENAI_API_KEY") {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!("OPENAI_API_KEY not found in environment variables"),
        };

        let defaults = AgentConfig::default();

        Ok(Self {
            host: var_or("RELAY_HOST", "0.0.0.0"),
            port: var_or("RELAY_PORT", "8000")
                .parse()
                .context("Invalid RELAY_PORT")?,

            openai_api_url: var_or("OPENAI_API_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            openai_api_key,

            upstream_connect_timeout_seconds: var_or("UPSTREAM_CONNECT_TIMEOUT_SECONDS", "10")
                .parse()
                .context("Invalid UPSTREAM_CONNECT_TIMEOUT_SECONDS")?,

            agent: AgentConfig {
                name: lookup("AGENT_NAME").unwrap_or(defaults.name),
                instructions: lookup("AGENT_INSTRUCTIONS").unwrap_or(defaults.instructions),
                model: lookup("AGENT_MODEL").unwrap_or(defaults.model),
            },
        })
    }
}
