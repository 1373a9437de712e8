//! Invoke with retry use case.
//!
//! Wraps one orchestrator call in bounded exponential backoff. Only
//! rate-limit failures are retried:
//!
//! ```text
//! Attempting(1) ──ok──▶ Succeeded
//!      │ rate-limited, n < max: sleep(delay), delay = min(delay × k, cap)
//!      ▼
//! Attempting(n) ──rate-limited, n == max──▶ Failed(RateLimitExceeded)
//!      │ any other error
//!      ▼
//!   Failed(original error, unchanged)
//! ```

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use lab_domain::{InvocationOutcome, InvocationPayload, RetryPolicy};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::ports::interaction_logger::{InteractionEvent, InteractionLogger, NoInteractionLogger};
use crate::ports::orchestrator::{Orchestrator, OrchestratorError};
use crate::ports::progress::{NoRunProgress, RunProgress};
use crate::ports::sleeper::Sleeper;

/// Terminal failure of a retried call
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// Still rate-limited after the last allowed attempt
    #[error(
        "Rate limited (HTTP 429) after {attempts} attempt(s). Stop running and try again later."
    )]
    RateLimitExceeded {
        attempts: u32,
        #[source]
        source: E,
    },

    /// Not a rate limit; surfaced unchanged on the first occurrence
    #[error(transparent)]
    Fatal(E),
}

impl<E> RetryError<E> {
    pub fn is_rate_limit_exceeded(&self) -> bool {
        matches!(self, RetryError::RateLimitExceeded { .. })
    }

    /// The error from the last attempt
    pub fn into_inner(self) -> E {
        match self {
            RetryError::RateLimitExceeded { source, .. } => source,
            RetryError::Fatal(e) => e,
        }
    }
}

/// Bounded retry around orchestrator invocations
pub struct InvocationRetrier {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    progress: Arc<dyn RunProgress>,
    interaction_logger: Arc<dyn InteractionLogger>,
}

impl InvocationRetrier {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            policy,
            sleeper,
            progress: Arc::new(NoRunProgress),
            interaction_logger: Arc::new(NoInteractionLogger),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn RunProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_interaction_logger(mut self, logger: Arc<dyn InteractionLogger>) -> Self {
        self.interaction_logger = logger;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke the orchestrator with `payload`, retrying rate-limit failures.
    pub async fn invoke(
        &self,
        handle: &dyn Orchestrator,
        payload: &InvocationPayload,
    ) -> Result<Value, RetryError<OrchestratorError>> {
        self.retry(move |_| handle.invoke(payload)).await
    }

    /// Run `call` (given the 1-based attempt number) under the retry policy.
    pub async fn retry<T, E, F, Fut>(&self, mut call: F) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut delay = self.policy.initial_delay();
        let mut attempt = 1;

        loop {
            match InvocationOutcome::classify(call(attempt).await) {
                InvocationOutcome::Success(value) => {
                    debug!(attempt, "Invocation succeeded");
                    return Ok(value);
                }
                InvocationOutcome::Fatal(e) => {
                    warn!(attempt, error = %e, "Invocation failed (not retried)");
                    return Err(RetryError::Fatal(e));
                }
                InvocationOutcome::RateLimited(e) if attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Rate limited, backing off"
                    );
                    self.progress.on_backoff(attempt, max_attempts, delay);
                    self.interaction_logger.log(InteractionEvent::new(
                        "retry_scheduled",
                        json!({
                            "attempt": attempt,
                            "max_attempts": max_attempts,
                            "delay_ms": delay.as_millis() as u64,
                            "error": e.to_string(),
                        }),
                    ));
                    self.sleeper.sleep(delay).await;
                    delay = self.policy.next_delay(delay);
                    attempt += 1;
                }
                InvocationOutcome::RateLimited(e) => {
                    error!(attempts = attempt, error = %e, "Rate limit persists, giving up");
                    return Err(RetryError::RateLimitExceeded {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_model::GatewayError;
    use async_trait::async_trait;
    use lab_domain::PayloadKey;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn slept(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        backoffs: Mutex<Vec<(u32, u32, Duration)>>,
    }

    impl RunProgress for RecordingProgress {
        fn on_backoff(&self, attempt: u32, max_attempts: u32, delay: Duration) {
            self.backoffs
                .lock()
                .unwrap()
                .push((attempt, max_attempts, delay));
        }
    }

    /// Replays scripted results; once the script runs out it repeats the
    /// fallback.
    struct ScriptedOrchestrator {
        script: Mutex<VecDeque<Result<Value, OrchestratorError>>>,
        fallback: fn() -> Result<Value, OrchestratorError>,
        calls: AtomicU32,
    }

    impl ScriptedOrchestrator {
        fn new(
            script: Vec<Result<Value, OrchestratorError>>,
            fallback: fn() -> Result<Value, OrchestratorError>,
        ) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Orchestrator for ScriptedOrchestrator {
        fn accepted_payload_keys(&self) -> &[PayloadKey] {
            &[PayloadKey::Input]
        }

        async fn invoke(&self, _payload: &InvocationPayload) -> Result<Value, OrchestratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(self.fallback)
        }
    }

    fn rate_limited() -> Result<Value, OrchestratorError> {
        Err(OrchestratorError::Gateway(GatewayError::Http {
            status: 429,
            reason: "Too Many Requests".into(),
            body: "Rate limit of 15 per 60s exceeded".into(),
        }))
    }

    fn unauthorized() -> Result<Value, OrchestratorError> {
        Err(OrchestratorError::Gateway(GatewayError::Http {
            status: 401,
            reason: "Unauthorized".into(),
            body: "Bad credentials".into(),
        }))
    }

    fn done() -> Result<Value, OrchestratorError> {
        Ok(json!({"output": "done"}))
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn payload() -> InvocationPayload {
        InvocationPayload::new(PayloadKey::Input, "What is 25 * 4 + 10?")
    }

    #[tokio::test]
    async fn test_recovers_after_k_rate_limits() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy::new(4, secs(2), 2.0, secs(16)).unwrap();
        let retrier = InvocationRetrier::new(policy, sleeper.clone());
        let stub = ScriptedOrchestrator::new(vec![rate_limited(), rate_limited()], done);

        let result = retrier.invoke(&stub, &payload()).await.unwrap();

        assert_eq!(result, json!({"output": "done"}));
        assert_eq!(stub.calls(), 3);
        assert_eq!(sleeper.slept(), vec![secs(2), secs(4)]);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy::new(3, secs(2), 2.0, secs(16)).unwrap();
        let retrier = InvocationRetrier::new(policy, sleeper.clone());
        let stub = ScriptedOrchestrator::new(vec![], rate_limited);

        let err = retrier.invoke(&stub, &payload()).await.unwrap_err();

        assert!(err.is_rate_limit_exceeded());
        assert!(matches!(err, RetryError::RateLimitExceeded { attempts: 3, .. }));
        assert!(err.to_string().contains("try again later"));
        assert_eq!(stub.calls(), 3);
        assert_eq!(sleeper.slept().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy::new(5, secs(2), 2.0, secs(16)).unwrap();
        let retrier = InvocationRetrier::new(policy, sleeper.clone());
        let stub = ScriptedOrchestrator::new(vec![unauthorized()], done);

        let err = retrier.invoke(&stub, &payload()).await.unwrap_err();

        assert!(!err.is_rate_limit_exceeded());
        assert_eq!(err.to_string(), "HTTP 401 Unauthorized: Bad credentials");
        assert!(matches!(
            err.into_inner(),
            OrchestratorError::Gateway(GatewayError::Http { status: 401, .. })
        ));
        assert_eq!(stub.calls(), 1);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_delays_are_capped_and_reported() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let progress = Arc::new(RecordingProgress::default());
        let policy = RetryPolicy::new(6, secs(2), 2.0, secs(5)).unwrap();
        let retrier =
            InvocationRetrier::new(policy, sleeper.clone()).with_progress(progress.clone());
        let stub = ScriptedOrchestrator::new(vec![], rate_limited);

        let _ = retrier.invoke(&stub, &payload()).await;

        let slept = sleeper.slept();
        assert_eq!(slept, vec![secs(2), secs(4), secs(5), secs(5), secs(5)]);
        assert!(slept.windows(2).all(|w| w[0] <= w[1]));

        let backoffs = progress.backoffs.lock().unwrap().clone();
        assert_eq!(backoffs.len(), 5);
        assert_eq!(backoffs[0], (1, 6, secs(2)));
        assert_eq!(backoffs[4], (5, 6, secs(5)));
    }

    #[tokio::test]
    async fn test_single_attempt_policy_never_sleeps() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let retrier = InvocationRetrier::new(RetryPolicy::no_retry(), sleeper.clone());
        let stub = ScriptedOrchestrator::new(vec![], rate_limited);

        let err = retrier.invoke(&stub, &payload()).await.unwrap_err();

        assert!(matches!(err, RetryError::RateLimitExceeded { attempts: 1, .. }));
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_generic_retry_sees_attempt_numbers() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let retrier = InvocationRetrier::new(RetryPolicy::default(), sleeper.clone());
        let seen = Mutex::new(Vec::new());

        let result: Result<&str, RetryError<String>> = retrier
            .retry(|attempt| {
                seen.lock().unwrap().push(attempt);
                async move {
                    if attempt == 1 {
                        Err("Too many requests".to_string())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(sleeper.slept(), vec![secs(2)]);
    }
}
