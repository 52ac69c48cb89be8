//! Trait definitions for the library module.

use async_trait::async_trait;

use super::error::ProcessError;
use crate::entry::Entry;

/// Files a completed torrent into its final location.
#[async_trait]
pub trait EntryProcessor: Send + Sync {
    /// Returns the name of this processor implementation.
    fn name(&self) -> &str;

    /// Processes one entry. Errors are final for that entry.
    async fn process(&self, entry: &Entry) -> Result<(), ProcessError>;
}
