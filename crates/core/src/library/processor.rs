//! Category dispatch: decides which files of an entry go where.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use super::config::LibraryConfig;
use super::error::ProcessError;
use super::files::{copy_file, extension_of, filter_files, FileFilter};
use super::traits::EntryProcessor;
use crate::entry::{Category, Entry};
use crate::heuristics::{parse_tv_episode, parse_tv_season, TvInfo};

/// Extensions treated as subtitles when filing movies.
pub const SUBTITLE_EXTENSIONS: [&str; 5] = [".srt", ".smi", ".ssa", ".ass", ".vtt"];

fn is_subtitle(name: &str) -> bool {
    let ext = extension_of(Path::new(name));
    SUBTITLE_EXTENSIONS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(&ext))
}

/// Files entries into a movie/TV library laid out as:
///
/// ```text
/// <movie_output_path>/<Name>.mkv
/// <movie_output_path>/<Name>.en.srt
/// <tv_output_path>/<Show>/<Show> S01E02.mkv
/// ```
///
/// Holds no state between entries.
#[derive(Debug, Clone)]
pub struct CategoryProcessor {
    library: LibraryConfig,
    dry_run: bool,
}

impl CategoryProcessor {
    pub fn new(library: LibraryConfig, dry_run: bool) -> Self {
        Self { library, dry_run }
    }

    pub fn library(&self) -> &LibraryConfig {
        &self.library
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    async fn copy_movie_single(&self, entry: &Entry) -> Result<(), ProcessError> {
        let mut filters = [
            FileFilter::new(is_subtitle),
            FileFilter::new(|name| !is_subtitle(name)),
        ];
        filter_files(&entry.content_path, &mut filters).await?;
        let [subtitles, videos] = filters;

        let video = match videos.files.as_slice() {
            [] => {
                return Err(ProcessError::NoVideo {
                    path: entry.content_path.clone(),
                })
            }
            [video] => video,
            files => {
                return Err(ProcessError::AmbiguousVideo {
                    files: files.to_vec(),
                })
            }
        };

        let destination = self
            .library
            .movie_output_path
            .join(format!("{}{}", entry.name, extension_of(video)));
        copy_file(video, &destination, self.dry_run).await?;

        // Only the first subtitle of each extension is kept, assumed English.
        let mut seen = HashSet::new();
        for subtitle in &subtitles.files {
            let ext = extension_of(subtitle);
            if !seen.insert(ext.to_ascii_lowercase()) {
                warn!(
                    subtitle = %subtitle.display(),
                    "Subtitle skipped because one was already copied for this extension"
                );
                continue;
            }

            let destination = self
                .library
                .movie_output_path
                .join(format!("{}.en{}", entry.name, ext));
            copy_file(subtitle, &destination, self.dry_run).await?;
        }

        Ok(())
    }

    async fn copy_tv_single(&self, entry: &Entry) -> Result<(), ProcessError> {
        if entry.number_of_files > 1 {
            return Err(ProcessError::TooManyFiles {
                number_of_files: entry.number_of_files,
            });
        }

        let info = parse_tv_episode(&entry.name)?;
        let dir = self.show_dir(&info).await?;

        let destination = dir.join(info.to_episode_name(&extension_of(&entry.content_path)));
        copy_file(&entry.content_path, &destination, self.dry_run).await?;
        Ok(())
    }

    async fn copy_tv_season(&self, entry: &Entry) -> Result<(), ProcessError> {
        if entry.number_of_files < 2 {
            return Err(ProcessError::TooFewFiles {
                number_of_files: entry.number_of_files,
            });
        }

        let season = parse_tv_season(&entry.name)?;
        let dir = self.show_dir(&season).await?;

        let mut episodes = Vec::new();
        let mut entries = fs::read_dir(&entry.content_path)
            .await
            .map_err(|e| ProcessError::io(&entry.content_path, e))?;
        while let Some(item) = entries
            .next_entry()
            .await
            .map_err(|e| ProcessError::io(&entry.content_path, e))?
        {
            let path = item.path();
            let file_type = item
                .file_type()
                .await
                .map_err(|e| ProcessError::io(&path, e))?;
            if file_type.is_dir() || !extension_of(&path).eq_ignore_ascii_case(".mkv") {
                continue;
            }
            episodes.push(path);
        }
        episodes.sort();

        for source in episodes {
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let parsed = parse_tv_episode(&file_name)?;
            let episode = TvInfo {
                name: season.name.clone(),
                season: season.season,
                episode: parsed.episode,
            };

            let destination = dir.join(episode.to_episode_name(&extension_of(&source)));
            copy_file(&source, &destination, self.dry_run).await?;
        }

        Ok(())
    }

    /// Finds the show's directory, matching existing names case-insensitively,
    /// and creates it when none matches.
    async fn show_dir(&self, info: &TvInfo) -> Result<PathBuf, ProcessError> {
        let root = &self.library.tv_output_path;
        let mut entries = fs::read_dir(root)
            .await
            .map_err(|e| ProcessError::io(root, e))?;

        while let Some(item) = entries
            .next_entry()
            .await
            .map_err(|e| ProcessError::io(root, e))?
        {
            let name = item.file_name().to_string_lossy().into_owned();
            if name.to_lowercase() != info.name.to_lowercase() {
                continue;
            }
            let is_dir = item
                .file_type()
                .await
                .map_err(|e| ProcessError::io(item.path(), e))?
                .is_dir();
            if is_dir {
                return Ok(item.path());
            }
        }

        let dir = root.join(&info.name);
        info!(dir = %dir.display(), dry_run = self.dry_run, "Creating TV show directory");
        if !self.dry_run {
            fs::create_dir(&dir)
                .await
                .map_err(|e| ProcessError::DirectoryCreationFailed {
                    path: dir.clone(),
                    source: e,
                })?;
        }
        Ok(dir)
    }
}

#[async_trait]
impl EntryProcessor for CategoryProcessor {
    fn name(&self) -> &str {
        "category"
    }

    async fn process(&self, entry: &Entry) -> Result<(), ProcessError> {
        info!(
            hash = %entry.hash,
            name = %entry.name,
            category = %entry.category,
            content_path = %entry.content_path.display(),
            dry_run = self.dry_run,
            "Processing"
        );

        if entry.number_of_files <= 0 {
            return Err(ProcessError::NoFiles {
                number_of_files: entry.number_of_files,
            });
        }

        if !fs::try_exists(&entry.content_path)
            .await
            .map_err(|e| ProcessError::io(&entry.content_path, e))?
        {
            return Err(ProcessError::ContentMissing {
                path: entry.content_path.clone(),
            });
        }

        match entry.category {
            Category::MovieSingle => self.copy_movie_single(entry).await,
            Category::TvSingle => self.copy_tv_single(entry).await,
            Category::TvSeason => self.copy_tv_season(entry).await,
            Category::Ignore => Ok(()),
        }
    }
}
