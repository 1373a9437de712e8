//! Backoff suspension port

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the calling sequence during retry backoff.
///
/// The production adapter wraps `tokio::time::sleep`; tests record the
/// requested durations instead of waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
