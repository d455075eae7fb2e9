//! Agent event stream → outbound SSE chunks
//!
//! Each raw text delta becomes exactly one `data:` line, in arrival order.
//! Everything else the runtime emits is dropped. When the source ends the
//! `[DONE]` marker follows. If the source fails partway, the client gets one
//! error chunk and the stream ends without `[DONE]`.

use std::convert::Infallible;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::chunk::{format_done, format_error_chunk, format_text_chunk};
use crate::{
    agent::AgentEventStream, error::AppError, logging::RequestContext,
    routes::metrics::record_stream,
};

/// Wraps one run's event stream. Single use: a new translator is built per request.
pub struct StreamTranslator {
    events: AgentEventStream,
    context: RequestContext,
}

/// Logs and counts how a stream ended. Dropping it unfinished counts as `cancelled`.
struct StreamOutcome {
    context: RequestContext,
    deltas: u64,
    recorded: bool,
}

impl StreamOutcome {
    fn new(context: RequestContext) -> Self {
        Self {
            context,
            deltas: 0,
            recorded: false,
        }
    }

    fn completed(&mut self) {
        self.recorded = true;
        self.context.log_stream_ended(self.deltas);
        record_stream("completed", self.deltas);
    }

    fn failed(&mut self, err: &AppError) {
        self.recorded = true;
        self.context.log_stream_failed(self.deltas, err);
        record_stream("failed", self.deltas);
    }
}

impl Drop for StreamOutcome {
    fn drop(&mut self) {
        if !self.recorded {
            self.context.log_stream_cancelled(self.deltas);
            record_stream("cancelled", self.deltas);
        }
    }
}

impl StreamTranslator {
    pub fn new(events: AgentEventStream, context: RequestContext) -> Self {
        Self { events, context }
    }

    /// Turn the translator into a byte stream suitable for a response body.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        let StreamTranslator {
            mut events,
            context,
        } = self;
        let mut outcome = StreamOutcome::new(context);

        async_stream::stream! {
            outcome.context.log_stream_started();

            while let Some(item) = events.next().await {
                let failure = match item {
                    Ok(event) => match event.text_delta().map(format_text_chunk) {
                        Some(Ok(bytes)) => {
                            outcome.deltas += 1;
                            yield Ok(bytes);
                            continue;
                        }
                        Some(Err(e)) => AppError::from(e),
                        None => continue,
                    },
                    Err(e) => e,
                };

                outcome.failed(&failure);
                if let Ok(bytes) = format_error_chunk(&failure.to_string()) {
                    yield Ok(bytes);
                }
                return;
            }

            outcome.completed();
            yield Ok(format_done());
        }
    }
}
