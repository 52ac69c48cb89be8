//! Driver configuration.

use std::time::Duration;

/// Delays applied to consecutive retryable queue errors.
///
/// Attempts past the end of the schedule reuse the last delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    delays: Vec<Duration>,
}

impl BackoffSchedule {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        self.delays
            .get(attempt)
            .or(self.delays.last())
            .copied()
            .unwrap_or_default()
    }

    /// Sum of the delays for the first `attempts` retries.
    pub fn total(&self, attempts: usize) -> Duration {
        (0..attempts).map(|attempt| self.delay(attempt)).sum()
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(30),
        ])
    }
}

/// What happens to a job after it was processed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoneAction {
    /// Delete the job file.
    #[default]
    Remove,
    /// Leave the job file and skip it until restart. Used for dry runs.
    Ignore,
}

/// Configuration for the queue driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Wait before polling again after finding the queue empty.
    pub dormant_period: Duration,

    /// Retries allowed for consecutive retryable queue errors.
    /// Negative means unlimited.
    pub max_retries: i32,

    /// Stop after this many successful jobs. Non-positive means unlimited.
    pub limit: i64,

    pub done_action: DoneAction,

    pub backoff: BackoffSchedule,
}

fn default_dormant_period() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> i32 {
    5
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            dormant_period: default_dormant_period(),
            max_retries: default_max_retries(),
            limit: -1,
            done_action: DoneAction::Remove,
            backoff: BackoffSchedule::default(),
        }
    }
}

impl DriverConfig {
    /// Sets the dormant period.
    pub fn with_dormant_period(mut self, period: Duration) -> Self {
        self.dormant_period = period;
        self
    }

    /// Sets the retry cap.
    pub fn with_max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the processed-job limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Simulates completion instead of deleting jobs.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.done_action = if dry_run {
            DoneAction::Ignore
        } else {
            DoneAction::Remove
        };
        self
    }

    /// Replaces the backoff schedule.
    pub fn with_backoff(mut self, backoff: BackoffSchedule) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether another retry is allowed after `retries` consecutive failures.
    pub fn may_retry(&self, retries: usize) -> bool {
        self.max_retries < 0 || retries < self.max_retries as usize
    }
}
