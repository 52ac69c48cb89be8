//! Mock entry processor for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::entry::Entry;
use crate::library::{EntryProcessor, ProcessError};

type ErrorFactory = Box<dyn Fn() -> ProcessError + Send + Sync>;

/// Mock implementation of the EntryProcessor trait.
///
/// Records every entry it is handed and succeeds unless a failure was
/// registered for the entry's hash.
#[derive(Clone, Default)]
pub struct MockProcessor {
    processed: Arc<RwLock<Vec<Entry>>>,
    failures: Arc<RwLock<HashMap<String, ErrorFactory>>>,
}

impl MockProcessor {
    /// Create a mock processor that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every entry with `hash` using the error built by `error`.
    pub async fn fail_hash<F>(&self, hash: &str, error: F)
    where
        F: Fn() -> ProcessError + Send + Sync + 'static,
    {
        self.failures
            .write()
            .await
            .insert(hash.to_string(), Box::new(error));
    }

    /// Entries handed to `process`, in order.
    pub async fn processed(&self) -> Vec<Entry> {
        self.processed.read().await.clone()
    }

    /// Hashes of the entries handed to `process`, in order.
    pub async fn processed_hashes(&self) -> Vec<String> {
        self.processed
            .read()
            .await
            .iter()
            .map(|e| e.hash.clone())
            .collect()
    }
}

impl std::fmt::Debug for MockProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProcessor").finish_non_exhaustive()
    }
}

#[async_trait]
impl EntryProcessor for MockProcessor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn process(&self, entry: &Entry) -> Result<(), ProcessError> {
        self.processed.write().await.push(entry.clone());
        match self.failures.read().await.get(&entry.hash) {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}
