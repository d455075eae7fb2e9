//! Request logging utilities
//!
//! Provides structured logging with a short correlation id so the log lines
//! of one relayed request (validation, run start, stream end) can be tied
//! together.

use std::time::Instant;
use tracing::{error, info, warn, Span};
use uuid::Uuid;

use crate::error::AppError;

/// Context for tracking a request through the relay
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Agent runner handling this request
    pub runner: String,
    /// API endpoint being called
    pub endpoint: String,
    /// Model named by the client (informational only)
    pub model: Option<String>,
    /// Number of messages in the incoming request
    pub message_count: usize,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(runner: &str, endpoint: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            runner: runner.to_string(),
            endpoint: endpoint.to_string(),
            model: None,
            message_count: 0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_message_count(mut self, count: usize) -> Self {
        self.message_count = count;
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Get elapsed time in seconds, for metrics
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn log_request_start(&self) {
        info!(
            trace_id = %self.trace_id,
            runner = %self.runner,
            endpoint = %self.endpoint,
            model = ?self.model,
            messages = %self.message_count,
            "Processing chat completion request"
        );
    }

    /// Log the most recent user message
    pub fn log_user_prompt(&self, prompt: &str) {
        info!(trace_id = %self.trace_id, "User prompt: {}", prompt);
    }

    pub fn log_stream_started(&self) {
        info!(
            trace_id = %self.trace_id,
            runner = %self.runner,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response started"
        );
    }

    pub fn log_stream_ended(&self, deltas: u64) {
        info!(
            trace_id = %self.trace_id,
            runner = %self.runner,
            deltas = %deltas,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response ended"
        );
    }

    /// Log a stream dropped before it ended, usually a client disconnect
    pub fn log_stream_cancelled(&self, deltas: u64) {
        info!(
            trace_id = %self.trace_id,
            runner = %self.runner,
            deltas = %deltas,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response cancelled"
        );
    }

    /// Log a failure after response headers were already sent
    pub fn log_stream_failed(&self, deltas: u64, err: &AppError) {
        error!(
            trace_id = %self.trace_id,
            runner = %self.runner,
            deltas = %deltas,
            kind = err.kind(),
            error = ?err,
            elapsed_ms = %self.elapsed_ms(),
            "Stream failed after it started"
        );
    }

    /// Log a request rejected for bad input
    pub fn log_rejected(&self, err: &AppError) {
        warn!(
            trace_id = %self.trace_id,
            runner = %self.runner,
            endpoint = %self.endpoint,
            kind = err.kind(),
            error = %err,
            elapsed_ms = %self.elapsed_ms(),
            "Request rejected"
        );
    }

    /// Create a tracing span for this request
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "relay_request",
            trace_id = %self.trace_id,
            runner = %self.runner,
            endpoint = %self.endpoint,
        )
    }
}
