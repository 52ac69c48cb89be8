//! Trait definitions for the queue module.

use async_trait::async_trait;

use super::error::QueueError;
use crate::entry::Entry;

/// Source of pending jobs for the processing loop.
#[async_trait]
pub trait JobQueue: Send {
    /// Returns the oldest pending job, or `None` when nothing is pending.
    async fn next(&mut self) -> Result<Option<Entry>, QueueError>;

    /// Marks a job as done and deletes it.
    async fn remove(&mut self, entry: &Entry) -> Result<(), QueueError>;

    /// Skips a job for the rest of this run without deleting it.
    async fn ignore(&mut self, entry: &Entry);
}
