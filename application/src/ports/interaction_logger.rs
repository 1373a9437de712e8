//! Port for structured interaction logging.
//!
//! Records what happened to each query (start, tool calls, retries, answer or
//! failure) as machine-readable events. This is separate from `tracing`:
//! tracing carries human-readable diagnostics, this port carries the
//! transcript.

use serde_json::Value;

/// A structured interaction event.
pub struct InteractionEvent {
    /// Event type identifier (`query_started`, `tool_call`, `retry_scheduled`,
    /// `answer`, `query_failed`).
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl InteractionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging interaction events.
///
/// `log` is synchronous and infallible: a transcript problem must never fail
/// a query.
pub trait InteractionLogger: Send + Sync {
    fn log(&self, event: InteractionEvent);
}

/// No-op implementation for tests and when the transcript is disabled.
pub struct NoInteractionLogger;

impl InteractionLogger for NoInteractionLogger {
    fn log(&self, _event: InteractionEvent) {}
}
