//! Queue driver implementation.
//!
//! One job at a time: poll the queue, process, complete, repeat. The only
//! suspension points besides I/O are the backoff and dormant sleeps, and both
//! give way to cancellation.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::library::EntryProcessor;
use crate::queue::JobQueue;

use super::config::{DoneAction, DriverConfig};
use super::types::{DriverError, DriverOutcome, StopReason};

/// Drains a [`JobQueue`] through an [`EntryProcessor`].
pub struct QueueDriver<Q: JobQueue, P: EntryProcessor> {
    queue: Q,
    processor: P,
    config: DriverConfig,
}

impl<Q: JobQueue, P: EntryProcessor> QueueDriver<Q, P> {
    pub fn new(queue: Q, processor: P, config: DriverConfig) -> Self {
        Self {
            queue,
            processor,
            config,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Runs until cancelled, until the job limit is reached, or until an error.
    ///
    /// Retryable queue errors back off and poll again; everything else ends
    /// the run. A job that fails processing is ignored for the rest of the run
    /// so its file stays available for inspection.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<DriverOutcome, DriverError> {
        let mut outcome = DriverOutcome {
            stop: StopReason::Cancelled,
            processed: 0,
            total_backoff: Duration::ZERO,
        };
        let mut retries = 0usize;
        let mut remaining = self.config.limit;

        info!(
            processor = self.processor.name(),
            dormant_period_secs = self.config.dormant_period.as_secs_f64(),
            max_retries = self.config.max_retries,
            limit = self.config.limit,
            done_action = ?self.config.done_action,
            "Queue driver started"
        );

        loop {
            if cancel.is_cancelled() {
                info!("Queue driver cancelled");
                return Ok(outcome);
            }

            let entry = match self.queue.next().await {
                Ok(entry) => {
                    retries = 0;
                    entry
                }
                Err(e) if e.is_retryable() => {
                    if !self.config.may_retry(retries) {
                        return Err(DriverError::RetriesExceeded {
                            max: self.config.max_retries,
                            source: e,
                        });
                    }

                    let delay = self.config.backoff.delay(retries);
                    retries += 1;
                    warn!(
                        error = %e,
                        attempt = retries,
                        max = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Failed to get next work entry, retrying"
                    );

                    if !pause(delay, &cancel).await {
                        info!("Queue driver cancelled during backoff");
                        return Ok(outcome);
                    }
                    outcome.total_backoff += delay;
                    continue;
                }
                Err(e) => return Err(DriverError::Queue(e)),
            };

            let Some(entry) = entry else {
                debug!(
                    dormant_period_secs = self.config.dormant_period.as_secs_f64(),
                    "Queue empty"
                );
                if !pause(self.config.dormant_period, &cancel).await {
                    info!("Queue driver cancelled while dormant");
                    return Ok(outcome);
                }
                continue;
            };

            if let Err(e) = self.processor.process(&entry).await {
                self.queue.ignore(&entry).await;
                error!(hash = %entry.hash, name = %entry.name, error = %e, "Processing failed");
                return Err(DriverError::Processing {
                    hash: entry.hash,
                    source: e,
                });
            }

            match self.config.done_action {
                DoneAction::Remove => {
                    self.queue
                        .remove(&entry)
                        .await
                        .map_err(|source| DriverError::Complete {
                            hash: entry.hash.clone(),
                            source,
                        })?
                }
                DoneAction::Ignore => self.queue.ignore(&entry).await,
            }

            outcome.processed += 1;
            info!(
                hash = %entry.hash,
                name = %entry.name,
                category = %entry.category,
                "Success"
            );

            if remaining > 0 {
                remaining -= 1;
                if remaining == 0 {
                    debug!(processed = outcome.processed, "Limit reached");
                    outcome.stop = StopReason::LimitReached;
                    return Ok(outcome);
                }
            }
        }
    }
}

/// Sleeps for `duration` unless cancelled first. Returns false on cancellation.
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel.cancelled() => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BackoffSchedule;
    use crate::entry::Category;
    use crate::library::ProcessError;
    use crate::queue::QueueError;
    use crate::testing::{fixtures, MockProcessor, MockQueue};
    use std::time::Instant;

    fn fast_config() -> DriverConfig {
        DriverConfig::default()
            .with_dormant_period(Duration::from_millis(5))
            .with_backoff(BackoffSchedule::new(vec![
                Duration::from_millis(1),
                Duration::from_millis(2),
                Duration::from_millis(5),
            ]))
    }

    #[tokio::test]
    async fn test_processes_until_limit() {
        let queue = MockQueue::new();
        queue.push_entry(fixtures::entry("a", "A", Category::Ignore)).await;
        queue.push_entry(fixtures::entry("b", "B", Category::Ignore)).await;
        queue.push_entry(fixtures::entry("c", "C", Category::Ignore)).await;
        let processor = MockProcessor::new();

        let mut driver =
            QueueDriver::new(queue.clone(), processor.clone(), fast_config().with_limit(2));
        assert_eq!(driver.config().limit, 2);
        let outcome = driver.run(CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.stop, StopReason::LimitReached);
        assert_eq!(outcome.processed, 2);
        assert_eq!(queue.remaining().await, 1);
        assert_eq!(queue.removed().await, vec!["a", "b"]);
        assert!(queue.ignored().await.is_empty());
        assert_eq!(processor.processed_hashes().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_dry_run_ignores_instead_of_removing() {
        let queue = MockQueue::new();
        queue.push_entry(fixtures::entry("a", "A", Category::Ignore)).await;
        let processor = MockProcessor::new();

        let config = fast_config().with_limit(1).with_dry_run(true);
        let mut driver = QueueDriver::new(queue.clone(), processor.clone(), config);
        driver.run(CancellationToken::new()).await.unwrap();

        let processed = processor.processed().await;
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].category, Category::Ignore);
        assert!(queue.removed().await.is_empty());
        assert_eq!(queue.ignored().await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_processing_failure_quarantines_and_stops() {
        let queue = MockQueue::new();
        queue.push_entry(fixtures::entry("bad", "Bad", Category::MovieSingle)).await;
        queue.push_entry(fixtures::entry("next", "Next", Category::Ignore)).await;
        let processor = MockProcessor::new();
        processor
            .fail_hash("bad", || ProcessError::NoFiles { number_of_files: 0 })
            .await;

        let mut driver = QueueDriver::new(queue.clone(), processor.clone(), fast_config());
        let err = driver.run(CancellationToken::new()).await.unwrap_err();

        assert!(matches!(
            err,
            DriverError::Processing { ref hash, source: ProcessError::NoFiles { .. } } if hash == "bad"
        ));
        assert_eq!(queue.ignored().await, vec!["bad"]);
        assert!(queue.removed().await.is_empty());
        assert_eq!(processor.processed_hashes().await, vec!["bad"]);
    }

    #[tokio::test]
    async fn test_backoff_sleeps_schedule_then_recovers() {
        let queue = MockQueue::new();
        for _ in 0..4 {
            queue.push_parse_error().await;
        }
        queue.push_entry(fixtures::entry("a", "A", Category::Ignore)).await;

        let config = fast_config().with_max_retries(5).with_limit(1);
        let expected = config.backoff.total(4);
        let mut driver = QueueDriver::new(queue, MockProcessor::new(), config);

        let started = Instant::now();
        let outcome = driver.run(CancellationToken::new()).await.unwrap();

        // 1 + 2 + 5 + 5 (clamped)
        assert_eq!(expected, Duration::from_millis(13));
        assert_eq!(outcome.total_backoff, expected);
        assert!(started.elapsed() >= expected);
        assert_eq!(outcome.processed, 1);
    }

    #[tokio::test]
    async fn test_retries_exceeded() {
        let queue = MockQueue::new();
        for _ in 0..4 {
            queue.push_parse_error().await;
        }

        let config = fast_config().with_max_retries(3);
        let mut driver = QueueDriver::new(queue.clone(), MockProcessor::new(), config);
        let err = driver.run(CancellationToken::new()).await.unwrap_err();

        assert!(matches!(
            err,
            DriverError::RetriesExceeded { max: 3, source: QueueError::Parse { .. } }
        ));
        assert_eq!(queue.next_calls().await, 4);
    }

    #[tokio::test]
    async fn test_success_resets_retry_counter() {
        let queue = MockQueue::new();
        queue.push_parse_error().await;
        queue.push_parse_error().await;
        queue.push_entry(fixtures::entry("a", "A", Category::Ignore)).await;
        queue.push_parse_error().await;
        queue.push_parse_error().await;
        queue.push_entry(fixtures::entry("b", "B", Category::Ignore)).await;

        let config = fast_config().with_max_retries(2).with_limit(2);
        let mut driver = QueueDriver::new(queue, MockProcessor::new(), config);
        let outcome = driver.run(CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.total_backoff, Duration::from_millis(6));
    }

    #[tokio::test]
    async fn test_remove_failure_ends_run() {
        let queue = MockQueue::new();
        queue.push_entry(fixtures::entry("a", "A", Category::Ignore)).await;
        queue.set_remove_error(true).await;

        let mut driver = QueueDriver::new(queue.clone(), MockProcessor::new(), fast_config());
        let err = driver.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            DriverError::Complete { ref hash, source: QueueError::Remove { .. } } if hash == "a"
        ));
        assert!(queue.removed().await.is_empty());
    }

    #[tokio::test]
    async fn test_poisoned_job_halts_run() {
        let queue = MockQueue::new();
        queue.push_poisoned("wrong.json", "right").await;

        let mut driver = QueueDriver::new(queue, MockProcessor::new(), fast_config());
        let err = driver.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DriverError::Queue(QueueError::Poisoned { .. })));
    }

    #[tokio::test]
    async fn test_cancel_while_dormant() {
        let queue = MockQueue::new();
        let config = fast_config().with_dormant_period(Duration::from_secs(3600));
        let mut driver = QueueDriver::new(queue.clone(), MockProcessor::new(), config);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let outcome = driver.run(cancel).await.unwrap();
        assert_eq!(outcome.stop, StopReason::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(queue.next_calls().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_during_backoff() {
        let queue = MockQueue::new();
        queue.push_parse_error().await;
        let config = fast_config()
            .with_max_retries(-1)
            .with_backoff(BackoffSchedule::new(vec![Duration::from_secs(3600)]));
        let mut driver = QueueDriver::new(queue, MockProcessor::new(), config);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let outcome = driver.run(cancel).await.unwrap();
        assert_eq!(outcome.stop, StopReason::Cancelled);
        assert_eq!(outcome.total_backoff, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_already_cancelled_does_not_poll() {
        let queue = MockQueue::new();
        queue.push_entry(fixtures::entry("a", "A", Category::Ignore)).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut driver = QueueDriver::new(queue.clone(), MockProcessor::new(), fast_config());
        let outcome = driver.run(cancel).await.unwrap();
        assert_eq!(outcome.processed, 0);
        assert_eq!(queue.next_calls().await, 0);
    }
}
