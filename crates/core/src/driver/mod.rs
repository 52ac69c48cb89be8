//! Queue driver.
//!
//! Pulls jobs from a [`JobQueue`](crate::queue::JobQueue) one at a time and
//! hands them to an [`EntryProcessor`](crate::library::EntryProcessor).
//! Retryable queue errors are retried on a fixed backoff schedule; an empty
//! queue puts the driver to sleep for the dormant period. Both waits end early
//! on cancellation.

mod config;
mod runner;
mod types;

pub use config::{BackoffSchedule, DoneAction, DriverConfig};
pub use runner::QueueDriver;
pub use types::{DriverError, DriverOutcome, StopReason};
