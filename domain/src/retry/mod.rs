//! Retry domain: backoff policy and attempt classification.
//!
//! - [`RetryPolicy`] — attempt cap and the capped, non-decreasing delay sequence
//! - [`InvocationOutcome`] — `Success` / `RateLimited` / `Fatal` for one attempt
//! - [`is_rate_limit_message`] — the message-based classifier

pub mod outcome;
pub mod policy;

pub use outcome::{InvocationOutcome, RATE_LIMIT_MARKERS, is_rate_limit_message};
pub use policy::{PolicyError, RetryPolicy};
