//! Run queries use case.
//!
//! Feeds queries one at a time through retrier → orchestrator → normalizer.
//! A failed query is reported and the run moves on; a query that stays
//! rate-limited after every retry stops the whole run, since further calls
//! would only burn quota.

use std::sync::Arc;

use lab_domain::util::truncate_str;
use lab_domain::{InvocationPayload, NormalizedAnswer, PayloadKey, extract_answer};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::RunConfig;
use crate::ports::interaction_logger::{InteractionEvent, InteractionLogger, NoInteractionLogger};
use crate::ports::orchestrator::{Orchestrator, OrchestratorError};
use crate::ports::progress::{NoRunProgress, RunProgress};
use crate::use_cases::invoke_with_retry::{InvocationRetrier, RetryError};

/// Queries run when none are given on the command line
pub const EXAMPLE_QUERIES: [&str; 5] = [
    "What time is it right now?",
    "What is 25 * 4 + 10?",
    "Reverse the string 'Hello World'",
    "What's the weather like today?",
    "What is the weather for 2023-04-05?",
];

/// Errors that end a run early
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Orchestrator accepts none of the known payload keys (accepts: {0:?})")]
    NoCompatiblePayload(Vec<PayloadKey>),

    #[error("Query {index} exhausted its retries: {source}")]
    RateLimitExceeded {
        index: usize,
        /// Reports for the queries before `index`
        completed: Vec<QueryReport>,
        #[source]
        source: RetryError<OrchestratorError>,
    },
}

/// What happened to one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answered(NormalizedAnswer),
    Failed(String),
    /// Dry run: nothing was sent
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    pub query: String,
    pub outcome: QueryOutcome,
}

impl QueryReport {
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            QueryOutcome::Answered(a) => Some(&a.text),
            _ => None,
        }
    }
}

/// Sequential query driver
pub struct QueryRunner {
    retrier: InvocationRetrier,
    config: RunConfig,
    progress: Arc<dyn RunProgress>,
    interaction_logger: Arc<dyn InteractionLogger>,
}

impl QueryRunner {
    pub fn new(retrier: InvocationRetrier, config: RunConfig) -> Self {
        Self {
            retrier,
            config,
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

    /// Run every query in order against `handle`.
    pub async fn run(
        &self,
        handle: &dyn Orchestrator,
        queries: &[String],
    ) -> Result<Vec<QueryReport>, RunError> {
        if self.config.dry_run {
            warn!("DRY_RUN is enabled, no API calls will be made");
            return Ok(queries
                .iter()
                .map(|q| QueryReport {
                    query: q.clone(),
                    outcome: QueryOutcome::Skipped,
                })
                .collect());
        }

        let accepted = handle.accepted_payload_keys();
        let key = PayloadKey::negotiate(accepted)
            .ok_or_else(|| RunError::NoCompatiblePayload(accepted.to_vec()))?;
        info!(payload_key = %key, queries = queries.len(), "Starting query run");

        let total = queries.len();
        let mut reports = Vec::with_capacity(total);

        for (i, query) in queries.iter().enumerate() {
            let index = i + 1;
            info!(index, query = %truncate_str(query, 100), "AI interaction started");
            self.progress.on_query_start(index, total, query);
            self.interaction_logger.log(InteractionEvent::new(
                "query_started",
                json!({ "index": index, "query": query }),
            ));

            let payload = InvocationPayload::new(key, query.as_str());
            match self.retrier.invoke(handle, &payload).await {
                Ok(raw) => {
                    let answer = extract_answer(&raw);
                    info!(
                        index,
                        answer = %truncate_str(&answer.text, 200),
                        "AI interaction result"
                    );
                    self.progress.on_answer(index, &answer);
                    self.interaction_logger.log(InteractionEvent::new(
                        "answer",
                        json!({ "index": index, "answer": answer.text }),
                    ));
                    reports.push(QueryReport {
                        query: query.clone(),
                        outcome: QueryOutcome::Answered(answer),
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(index, error = %message, "AI interaction error");
                    self.progress.on_query_failed(index, &message);
                    self.interaction_logger.log(InteractionEvent::new(
                        "query_failed",
                        json!({
                            "index": index,
                            "error": message,
                            "rate_limited": e.is_rate_limit_exceeded(),
                        }),
                    ));
                    if e.is_rate_limit_exceeded() {
                        return Err(RunError::RateLimitExceeded {
                            index,
                            completed: reports,
                            source: e,
                        });
                    }
                    reports.push(QueryReport {
                        query: query.clone(),
                        outcome: QueryOutcome::Failed(message),
                    });
                }
            }
        }

        Ok(reports)
    }
}

/// The built-in example queries as owned strings
pub fn example_queries() -> Vec<String> {
    EXAMPLE_QUERIES.iter().map(|q| q.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_model::GatewayError;
    use crate::ports::sleeper::Sleeper;
    use async_trait::async_trait;
    use lab_domain::RetryPolicy;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::time::Duration;

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    #[derive(Default)]
    struct MemoryLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl InteractionLogger for MemoryLogger {
        fn log(&self, event: InteractionEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    /// Answers by query text: "boom" fails, "throttle" is always
    /// rate-limited, anything else is echoed back.
    struct EchoOrchestrator {
        keys: Vec<PayloadKey>,
        seen: Mutex<Vec<(PayloadKey, String)>>,
    }

    impl EchoOrchestrator {
        fn accepting(keys: &[PayloadKey]) -> Self {
            Self {
                keys: keys.to_vec(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Orchestrator for EchoOrchestrator {
        fn accepted_payload_keys(&self) -> &[PayloadKey] {
            &self.keys
        }

        async fn invoke(&self, payload: &InvocationPayload) -> Result<Value, OrchestratorError> {
            self.seen
                .lock()
                .unwrap()
                .push((payload.key(), payload.query().to_string()));
            match payload.query() {
                "boom" => Err(OrchestratorError::Other("tool exploded".into())),
                "throttle" => Err(OrchestratorError::Gateway(GatewayError::Http {
                    status: 429,
                    reason: "Too Many Requests".into(),
                    body: String::new(),
                })),
                q => Ok(json!({
                    "messages": [{ "role": "assistant", "content": format!("echo: {q}") }]
                })),
            }
        }
    }

    fn live_runner() -> QueryRunner {
        let retrier = InvocationRetrier::new(RetryPolicy::default(), Arc::new(NoSleep));
        QueryRunner::new(retrier, RunConfig::default().with_dry_run(false))
    }

    fn queries(qs: &[&str]) -> Vec<String> {
        qs.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn test_answers_are_normalized_in_order() {
        let runner = live_runner();
        let orchestrator = EchoOrchestrator::accepting(&[PayloadKey::Input, PayloadKey::Messages]);

        let reports = runner
            .run(&orchestrator, &queries(&["one", "two"]))
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].answer(), Some("echo: one"));
        assert_eq!(reports[1].answer(), Some("echo: two"));
        // messages is preferred when accepted
        assert!(
            orchestrator
                .seen
                .lock()
                .unwrap()
                .iter()
                .all(|(k, _)| *k == PayloadKey::Messages)
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_run() {
        let logger = Arc::new(MemoryLogger::default());
        let runner = live_runner().with_interaction_logger(logger.clone());
        let orchestrator = EchoOrchestrator::accepting(&[PayloadKey::Query]);

        let reports = runner
            .run(&orchestrator, &queries(&["boom", "fine"]))
            .await
            .unwrap();

        assert_eq!(reports[0].outcome, QueryOutcome::Failed("tool exploded".into()));
        assert_eq!(reports[1].answer(), Some("echo: fine"));
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["query_started", "query_failed", "query_started", "answer"]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_stops_the_run() {
        let runner = live_runner();
        let orchestrator = EchoOrchestrator::accepting(&[PayloadKey::Input]);

        let err = runner
            .run(&orchestrator, &queries(&["first", "throttle", "never"]))
            .await
            .unwrap_err();

        let RunError::RateLimitExceeded {
            index, completed, ..
        } = err
        else {
            panic!("expected rate limit exhaustion");
        };
        assert_eq!(index, 2);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].answer(), Some("echo: first"));
        let seen: Vec<String> = orchestrator
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|(_, q)| q.clone())
            .collect();
        // two attempts on "throttle", nothing for "never"
        assert_eq!(seen, vec!["first", "throttle", "throttle"]);
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_calls() {
        let retrier = InvocationRetrier::new(RetryPolicy::default(), Arc::new(NoSleep));
        let runner = QueryRunner::new(retrier, RunConfig::default());
        let orchestrator = EchoOrchestrator::accepting(&[PayloadKey::Input]);

        let reports = runner.run(&orchestrator, &example_queries()).await.unwrap();

        assert_eq!(reports.len(), 5);
        assert!(reports.iter().all(|r| r.outcome == QueryOutcome::Skipped));
        assert!(orchestrator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_common_payload_key() {
        let runner = live_runner();
        let orchestrator = EchoOrchestrator::accepting(&[]);

        let err = runner
            .run(&orchestrator, &queries(&["q"]))
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::NoCompatiblePayload(_)));
    }
}
