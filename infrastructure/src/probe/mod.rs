//! Provider diagnostics

mod rate_limit;

pub use rate_limit::{
    PROBE_MAX_TOKENS, PROBE_PROMPT, ProbeError, ProbeReport, RateLimitHeaders, RetryAfter,
    interpret_retry_after, pretty_wait, probe, reset_to_utc_iso,
};
