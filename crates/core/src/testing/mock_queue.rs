//! Mock job queue for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::entry::Entry;
use crate::queue::{JobQueue, QueueError};

/// One scripted response to [`JobQueue::next`].
#[derive(Debug, Clone)]
pub enum ScriptedNext {
    /// Serve this entry.
    Entry(Entry),
    /// Fail with a retryable parse error.
    ParseError,
    /// Fail with a poisoned-job error for `file` whose content says `hash`.
    Poisoned { file: String, hash: String },
}

/// Mock implementation of the JobQueue trait.
///
/// Responses are served in the order they were pushed. Once the script runs
/// out the queue reports itself empty. Clones share state, so a test can keep
/// one handle while the driver owns another.
#[derive(Debug, Clone, Default)]
pub struct MockQueue {
    script: Arc<RwLock<VecDeque<ScriptedNext>>>,
    removed: Arc<RwLock<Vec<String>>>,
    ignored: Arc<RwLock<Vec<String>>>,
    next_calls: Arc<RwLock<usize>>,
    remove_error: Arc<RwLock<bool>>,
}

impl MockQueue {
    /// Create an empty mock queue.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_entry(&self, entry: Entry) {
        self.script.write().await.push_back(ScriptedNext::Entry(entry));
    }

    pub async fn push_parse_error(&self) {
        self.script.write().await.push_back(ScriptedNext::ParseError);
    }

    pub async fn push_poisoned(&self, file: &str, hash: &str) {
        self.script.write().await.push_back(ScriptedNext::Poisoned {
            file: file.to_string(),
            hash: hash.to_string(),
        });
    }

    /// Make every following `remove` call fail.
    pub async fn set_remove_error(&self, fail: bool) {
        *self.remove_error.write().await = fail;
    }

    /// Hashes removed so far, in order.
    pub async fn removed(&self) -> Vec<String> {
        self.removed.read().await.clone()
    }

    /// Hashes ignored so far, in order.
    pub async fn ignored(&self) -> Vec<String> {
        self.ignored.read().await.clone()
    }

    /// Number of times `next` was called.
    pub async fn next_calls(&self) -> usize {
        *self.next_calls.read().await
    }

    /// Responses not yet served.
    pub async fn remaining(&self) -> usize {
        self.script.read().await.len()
    }
}

#[async_trait]
impl JobQueue for MockQueue {
    async fn next(&mut self) -> Result<Option<Entry>, QueueError> {
        *self.next_calls.write().await += 1;

        match self.script.write().await.pop_front() {
            None => Ok(None),
            Some(ScriptedNext::Entry(entry)) => Ok(Some(entry)),
            Some(ScriptedNext::ParseError) => Err(QueueError::Parse {
                path: PathBuf::from("/work/partial.json"),
                source: serde_json::Error::io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "truncated job file",
                )),
            }),
            Some(ScriptedNext::Poisoned { file, hash }) => Err(QueueError::Poisoned {
                path: PathBuf::from("/work").join(file),
                expected: PathBuf::from("/work").join(format!("{}.json", hash)),
            }),
        }
    }

    async fn remove(&mut self, entry: &Entry) -> Result<(), QueueError> {
        if *self.remove_error.read().await {
            return Err(QueueError::Remove {
                path: PathBuf::from("/work").join(entry.file_name()),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.removed.write().await.push(entry.hash.clone());
        Ok(())
    }

    async fn ignore(&mut self, entry: &Entry) {
        self.ignored.write().await.push(entry.hash.clone());
    }
}
