//! Retry policy value object

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid retry policy parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("backoff_multiplier must be greater than 1 (got {0})")]
    InvalidMultiplier(f64),

    #[error("initial_delay ({initial:?}) exceeds max_delay ({max:?})")]
    InitialDelayExceedsMax { initial: Duration, max: Duration },
}

/// Bounded exponential backoff for rate-limited calls.
///
/// The delay before retry `n + 1` is `initial_delay * multiplier^(n - 1)`,
/// capped at `max_delay`, so the sequence never decreases and never exceeds
/// the cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        backoff_multiplier: f64,
        max_delay: Duration,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if !backoff_multiplier.is_finite() || backoff_multiplier <= 1.0 {
            return Err(PolicyError::InvalidMultiplier(backoff_multiplier));
        }
        if initial_delay > max_delay {
            return Err(PolicyError::InitialDelayExceedsMax {
                initial: initial_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
            max_delay,
        })
    }

    /// Single attempt, never sleeps
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay that follows `current` in the backoff sequence
    pub fn next_delay(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.backoff_multiplier;
        if scaled >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(scaled)
        }
    }

    /// Every sleep a fully exhausted run would perform, in order
    /// (`max_attempts - 1` entries).
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial_delay), |d| Some(self.next_delay(*d)))
            .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

impl Default for RetryPolicy {
    /// Two attempts, 2s first backoff, doubling, capped at 16s
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(16),
        }
    }
}
