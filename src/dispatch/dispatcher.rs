//! Query dispatcher with per-call timeout and bounded retry.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::dispatch::source::{DataSource, LookupError, LookupRequest, QueryResult};
use crate::error::{ConciergeError, Result};

/// Sends lookups to a [`DataSource`].
///
/// Each attempt is bounded by `timeout`. A failed or timed-out attempt is
/// retried immediately up to `retry_count` times; when every attempt fails the
/// dispatcher returns [`ConciergeError::DataUnavailable`].
#[derive(Clone)]
pub struct QueryDispatcher {
    source: Arc<dyn DataSource>,
    retry_count: u32,
    timeout: Duration,
}

impl std::fmt::Debug for QueryDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDispatcher")
            .field("source", &self.source.name())
            .field("retry_count", &self.retry_count)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl QueryDispatcher {
    pub fn new(source: Arc<dyn DataSource>, retry_count: u32, timeout: Duration) -> Self {
        Self {
            source,
            retry_count,
            timeout,
        }
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// Total number of attempts per dispatch.
    pub fn attempts(&self) -> u32 {
        1 + self.retry_count
    }

    pub async fn dispatch(&self, request: &LookupRequest) -> Result<QueryResult> {
        let attempts = self.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            let lookup = self.source.lookup(request);
            let outcome = match tokio::time::timeout(self.timeout, lookup).await {
                Ok(outcome) => outcome,
                Err(_) => Err(LookupError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(QueryResult::Records(records)) => {
                    debug!(
                        "{} returned {} record(s) for {}",
                        self.source.name(),
                        records.len(),
                        request.intent
                    );
                    return Ok(QueryResult::from_records(records));
                }
                Ok(QueryResult::NotFound) => return Ok(QueryResult::NotFound),
                Err(e) => {
                    warn!(
                        "lookup {} on {} failed (attempt {attempt}/{attempts}): {e}",
                        request.intent,
                        self.source.name()
                    );
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(ConciergeError::data_unavailable(attempts, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::dispatch::source::RecordSet;
    use crate::intent::Intent;

    /// Fails the first `failures` calls, then answers.
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl DataSource for FlakySource {
        async fn lookup(
            &self,
            _request: &LookupRequest,
        ) -> std::result::Result<QueryResult, LookupError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(LookupError::Unavailable("connection reset".into()));
            }
            let record = [("name".to_string(), "Gym".to_string())].into_iter().collect();
            Ok(QueryResult::Records(RecordSet::new("facilities", vec![record])))
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    struct SlowSource;

    #[async_trait]
    impl DataSource for SlowSource {
        async fn lookup(
            &self,
            _request: &LookupRequest,
        ) -> std::result::Result<QueryResult, LookupError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(QueryResult::NotFound)
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn flaky(failures: u32) -> Arc<FlakySource> {
        Arc::new(FlakySource {
            failures,
            calls: AtomicU32::new(0),
        })
    }

    fn request() -> LookupRequest {
        LookupRequest::new(Intent::FacilityLocation)
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let source = flaky(1);
        let dispatcher = QueryDispatcher::new(source.clone(), 1, Duration::from_secs(1));
        let result = dispatcher.dispatch(&request()).await.unwrap();
        assert_eq!(result.records().len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries() {
        let source = flaky(5);
        let dispatcher = QueryDispatcher::new(source.clone(), 1, Duration::from_secs(1));
        match dispatcher.dispatch(&request()).await {
            Err(ConciergeError::DataUnavailable { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry() {
        let source = flaky(1);
        let dispatcher = QueryDispatcher::new(source.clone(), 0, Duration::from_secs(1));
        assert!(dispatcher.dispatch(&request()).await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let dispatcher = QueryDispatcher::new(Arc::new(SlowSource), 1, Duration::from_millis(100));
        match dispatcher.dispatch(&request()).await {
            Err(ConciergeError::DataUnavailable { attempts, reason }) => {
                assert_eq!(attempts, 2);
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }
}
