//! Logging infrastructure: the JSONL interaction transcript.
//!
//! Provides [`JsonlInteractionLogger`], which implements the
//! [`InteractionLogger`](lab_application::InteractionLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlInteractionLogger;
