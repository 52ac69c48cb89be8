//! File grouping and the existence-checked copy used for every placement.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

use super::error::ProcessError;

const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Collects the files whose names satisfy a predicate.
pub struct FileFilter {
    /// Matching files, full paths, sorted after [`filter_files`].
    pub files: Vec<PathBuf>,
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl FileFilter {
    pub fn new(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            files: Vec::new(),
            predicate: Box::new(predicate),
        }
    }

    fn offer(&mut self, name: &str, path: &Path) {
        if (self.predicate)(name) {
            self.files.push(path.to_path_buf());
        }
    }
}

impl std::fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileFilter")
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}

/// Extension of `path` including the leading dot, or `""`.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Walks `root` recursively and hands every file to each filter.
///
/// A `root` that is not a directory is treated as a single file.
pub async fn filter_files(root: &Path, filters: &mut [FileFilter]) -> Result<(), ProcessError> {
    let meta = fs::metadata(root)
        .await
        .map_err(|e| ProcessError::io(root, e))?;

    if !meta.is_dir() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for filter in filters.iter_mut() {
            filter.offer(&name, root);
        }
        return Ok(());
    }

    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| ProcessError::io(&dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProcessError::io(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ProcessError::io(&path, e))?;

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            for filter in filters.iter_mut() {
                filter.offer(&name, &path);
            }
        }
    }

    // read_dir order is platform dependent
    for filter in filters.iter_mut() {
        filter.files.sort();
    }

    Ok(())
}

/// Copies `source` to `destination`, refusing to overwrite.
///
/// The existence check runs in dry-run mode too; nothing else does. Bytes are
/// written to a hidden `.partial` sibling that is hard-linked into place once
/// complete, so a failed copy never leaves a truncated file at `destination`
/// and a file that appeared there meanwhile is never replaced. A `.partial`
/// left behind by an interrupted run is overwritten.
///
/// Returns the number of bytes copied (0 in dry-run mode).
pub async fn copy_file(source: &Path, destination: &Path, dry_run: bool) -> Result<u64, ProcessError> {
    info!(
        from = %source.display(),
        to = %destination.display(),
        dry_run,
        "Copying file"
    );

    if fs::try_exists(destination)
        .await
        .map_err(|e| ProcessError::io(destination, e))?
    {
        return Err(ProcessError::DestinationExists {
            path: destination.to_path_buf(),
        });
    }

    if dry_run {
        return Ok(0);
    }

    let copy_failed =
        |e| ProcessError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e);

    let partial = partial_path(destination);
    let bytes = write_partial(source, &partial).await.map_err(copy_failed)?;
    publish(&partial, destination).await.map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => ProcessError::DestinationExists {
            path: destination.to_path_buf(),
        },
        _ => copy_failed(e),
    })?;

    debug!(bytes, to = %destination.display(), "Copy complete");
    Ok(bytes)
}

fn partial_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.partial", name))
}

/// Copies `source` into `partial`. Removes `partial` again if the copy fails
/// after it was opened.
async fn write_partial(source: &Path, partial: &Path) -> std::io::Result<u64> {
    let source_file = File::open(source).await?;
    let dest_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(partial)
        .await?;

    let written = async {
        let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, source_file);
        let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

        let bytes = tokio::io::copy_buf(&mut reader, &mut writer).await?;
        writer.flush().await?;
        writer.into_inner().sync_all().await?;
        Ok::<_, std::io::Error>(bytes)
    }
    .await;

    if written.is_err() {
        discard_partial(partial).await;
    }
    written
}

/// Links the finished `partial` to `destination`, failing with
/// `AlreadyExists` instead of replacing a file, then drops `partial`.
async fn publish(partial: &Path, destination: &Path) -> std::io::Result<()> {
    let linked = fs::hard_link(partial, destination).await;
    discard_partial(partial).await;
    linked
}

async fn discard_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %partial.display(), error = %e, "Failed to remove partial copy");
        }
    }
}
