//! Directory-backed job queue.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::error::QueueError;
use super::traits::JobQueue;
use crate::entry::Entry;

/// A directory of `<hash>.json` job files served oldest first.
///
/// Jobs that were ignored or found poisoned are remembered in memory for the
/// lifetime of this value only. Nothing about them is written to disk, so a
/// restart makes them eligible again.
#[derive(Debug)]
pub struct WorkQueue {
    dir: PathBuf,
    processed: HashSet<String>,
}

impl WorkQueue {
    /// Opens the queue at `dir`, which must be an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, QueueError> {
        let dir = dir.into();
        let meta = std::fs::metadata(&dir).map_err(|source| QueueError::InvalidPath {
            path: dir.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(QueueError::NotADirectory { path: dir });
        }

        Ok(Self {
            dir,
            processed: HashSet::new(),
        })
    }

    /// The work directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an entry is stored under.
    pub fn entry_path(&self, entry: &Entry) -> PathBuf {
        self.dir.join(entry.file_name())
    }

    /// Whether the job file `file_name` is skipped for the rest of this run.
    pub fn is_processed(&self, file_name: &str) -> bool {
        self.processed.contains(file_name)
    }

    /// Writes a new job file. Fails if a job with the same hash exists.
    pub async fn add(&self, entry: &Entry) -> Result<PathBuf, QueueError> {
        let data = serde_json::to_vec_pretty(entry).map_err(QueueError::Serialize)?;
        let path = self.entry_path(entry);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::AlreadyExists {
                    QueueError::AlreadyExists { path: path.clone() }
                } else {
                    QueueError::Write {
                        path: path.clone(),
                        source,
                    }
                }
            })?;

        let written = async {
            file.write_all(&data).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(source) = written {
            drop(file);
            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove incomplete job file");
            }
            return Err(QueueError::Write { path, source });
        }

        info!(hash = %entry.hash, path = %path.display(), "Added job");
        Ok(path)
    }

    /// Oldest job file not yet memoized. Ties go to the smaller file name.
    async fn oldest_candidate(&self) -> Result<Option<(PathBuf, String)>, QueueError> {
        let read_dir_err = |source| QueueError::ReadDir {
            path: self.dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.dir).await.map_err(read_dir_err)?;
        let mut oldest: Option<(SystemTime, String)> = None;

        while let Some(item) = entries.next_entry().await.map_err(read_dir_err)? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let name = item.file_name().to_string_lossy().into_owned();
            if self.processed.contains(&name) {
                continue;
            }

            let meta = item.metadata().await.map_err(read_dir_err)?;
            if meta.is_dir() {
                continue;
            }
            let modified = meta.modified().map_err(read_dir_err)?;

            let is_older = match &oldest {
                None => true,
                Some((time, current)) => (modified, &name) < (*time, current),
            };
            if is_older {
                oldest = Some((modified, name));
            }
        }

        Ok(oldest.map(|(modified, name)| {
            debug!(
                file = %name,
                modified = %DateTime::<Utc>::from(modified).to_rfc3339(),
                "Selected oldest job"
            );
            (self.dir.join(&name), name)
        }))
    }
}

#[async_trait]
impl JobQueue for WorkQueue {
    async fn next(&mut self) -> Result<Option<Entry>, QueueError> {
        let Some((path, name)) = self.oldest_candidate().await? else {
            return Ok(None);
        };

        let data = fs::read(&path).await.map_err(|source| QueueError::Read {
            path: path.clone(),
            source,
        })?;

        // A parse failure is not memoized: the file may still be being written.
        let entry: Entry = serde_json::from_slice(&data).map_err(|source| QueueError::Parse {
            path: path.clone(),
            source,
        })?;

        let expected = self.entry_path(&entry);
        if expected != path {
            self.processed.insert(name);
            return Err(QueueError::Poisoned { path, expected });
        }

        Ok(Some(entry))
    }

    async fn remove(&mut self, entry: &Entry) -> Result<(), QueueError> {
        let path = self.entry_path(entry);
        fs::remove_file(&path)
            .await
            .map_err(|source| QueueError::Remove {
                path: path.clone(),
                source,
            })?;
        debug!(hash = %entry.hash, path = %path.display(), "Removed job");
        Ok(())
    }

    async fn ignore(&mut self, entry: &Entry) {
        debug!(hash = %entry.hash, "Ignoring job until restart");
        self.processed.insert(entry.file_name());
    }
}
