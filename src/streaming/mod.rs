//! SSE (Server-Sent Events) streaming utilities
//!
//! Decoding of upstream SSE bodies into frames, the outbound chunk format,
//! and the translator that turns agent events into outbound chunks.

pub mod chunk;
pub mod translator;

pub use chunk::{format_done, format_error_chunk, format_text_chunk, StreamChunk};
pub use translator::StreamTranslator;

/// One dispatched SSE event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// Value of the last `event:` field, if any
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`
    pub data: String,
}

/// Incremental SSE decoder.
///
/// Network chunks rarely line up with SSE lines, so raw bytes are held until
/// a full line is available. Decoding to UTF-8 happens per line, which keeps
/// multi-byte characters that straddle two chunks intact.
///
/// # Example
/// ```
/// use agent_relay::streaming::SseDecoder;
///
/// let mut decoder = SseDecoder::new();
///
/// let frames = decoder.feed(b"event: delta\ndata: {\"delta\":\"hel");
/// assert!(frames.is_empty());
///
/// let frames = decoder.feed(b"lo\"}\n\n");
/// assert_eq!(frames[0].event.as_deref(), Some("delta"));
/// assert_eq!(frames[0].data, "{\"delta\":\"hello\"}");
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes after the last newline seen
    pending: Vec<u8>,
    /// Frame being assembled from fields seen so far
    current: SseFrame,
    /// Whether `current` has received any `data:` field
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the decoder and return every frame completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(newline_pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline_pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Flush a trailing frame that was never followed by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&rest).into_owned();
            let line = line.trim_end_matches('\r');
            if let Some(frame) = self.process_line(line) {
                return Some(frame);
            }
        }
        self.dispatch()
    }

    /// Whether undispatched data remains.
    pub fn has_incomplete(&self) -> bool {
        !self.pending.is_empty() || self.has_data
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.current.event = Some(value.to_string()),
            "data" => {
                if self.has_data {
                    self.current.data.push('\n');
                }
                self.current.data.push_str(value);
                self.has_data = true;
            }
            // id / retry and unknown fields carry nothing we use
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let frame = std::mem::take(&mut self.current);
        if !std::mem::take(&mut self.has_data) {
            return None;
        }
        Some(frame)
    }
}
