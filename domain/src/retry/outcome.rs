//! Per-attempt invocation outcome and rate-limit classification

use std::fmt::Display;

/// Case-insensitive substrings that mark an error as upstream throttling
pub const RATE_LIMIT_MARKERS: &[&str] = &["too many requests", "429", "rate limit"];

/// Whether an error message signals rate limiting
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Result of one call attempt, classified for the retry state machine
#[derive(Debug)]
pub enum InvocationOutcome<T, E> {
    Success(T),
    /// Transient: retried while attempts remain
    RateLimited(E),
    /// Anything else: surfaced unchanged, never retried
    Fatal(E),
}

impl<T, E: Display> InvocationOutcome<T, E> {
    /// Classify a raw call result by inspecting the error message
    pub fn classify(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => InvocationOutcome::Success(value),
            Err(e) if is_rate_limit_message(&e.to_string()) => InvocationOutcome::RateLimited(e),
            Err(e) => InvocationOutcome::Fatal(e),
        }
    }
}

impl<T, E> InvocationOutcome<T, E> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InvocationOutcome::RateLimited(_))
    }
}
