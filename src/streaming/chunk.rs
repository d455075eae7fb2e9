//! Outbound chunk format
//!
//! Every text delta goes out as `data: {"choices":[{"delta":{"content":...},"index":0}]}`
//! followed by a blank line. A finished stream ends with `data: [DONE]`.

use bytes::Bytes;
use serde::Serialize;

/// OpenAI-style streaming chunk carrying one text delta.
#[derive(Debug, Clone, Serialize)]
pub struct StreamChunk {
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamChoice {
    pub delta: Delta,
    pub index: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Delta {
    pub content: String,
}

impl StreamChunk {
    /// Chunk with a single choice at index 0.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![StreamChoice {
                delta: Delta {
                    content: content.into(),
                },
                index: 0,
            }],
        }
    }
}

/// Error payload sent when a run fails after streaming started.
#[derive(Debug, Serialize)]
struct StreamErrorChunk<'a> {
    error: StreamErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct StreamErrorBody<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    error_type: &'static str,
}

fn sse_data<T: Serialize>(payload: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(Bytes::from(format!("data: {}\n\n", json)))
}

/// Format a text delta as an SSE data event.
pub fn format_text_chunk(content: &str) -> Result<Bytes, serde_json::Error> {
    sse_data(&StreamChunk::text(content))
}

/// The stream termination marker: `data: [DONE]\n\n`
pub fn format_done() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}

/// Format a mid-stream failure as an SSE data event.
pub fn format_error_chunk(message: &str) -> Result<Bytes, serde_json::Error> {
    sse_data(&StreamErrorChunk {
        error: StreamErrorBody {
            message,
            error_type: "stream_error",
        },
    })
}
