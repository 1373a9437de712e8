//! Progress notification port
//!
//! Defines the interface for reporting progress while queries run.

use std::time::Duration;

use lab_domain::NormalizedAnswer;

/// Callback for progress updates during a query run
///
/// Implementations live in the presentation layer. Every method has a no-op
/// default. Indices are 1-based.
pub trait RunProgress: Send + Sync {
    /// Called when query `index` of `total` starts
    fn on_query_start(&self, _index: usize, _total: usize, _query: &str) {}

    /// Called before sleeping for a rate-limit backoff
    fn on_backoff(&self, _attempt: u32, _max_attempts: u32, _delay: Duration) {}

    /// Called when a query produced an answer
    fn on_answer(&self, _index: usize, _answer: &NormalizedAnswer) {}

    /// Called when a query failed; `error` is the display form
    fn on_query_failed(&self, _index: usize, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoRunProgress;

impl RunProgress for NoRunProgress {}
