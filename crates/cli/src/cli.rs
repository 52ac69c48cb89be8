//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shelver_core::{Category, Entry};

#[derive(Debug, Parser)]
#[command(
    name = "shelver",
    version,
    about = "Files completed torrents into a movie and TV library"
)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "SHELVER_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Also write JSON logs to this file.
    #[arg(long, global = true, env = "SHELVER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a completed torrent to the work to be processed.
    Add(AddArgs),
    /// Process queued work until stopped.
    Process(ProcessArgs),
}

impl Command {
    /// Label attached to every log line of the invocation.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Process(_) => "process",
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Torrent name.
    #[arg(long)]
    pub name: String,
    /// Category of the torrent: MovieSingle, TvSingle, TvSeason, Ignore.
    #[arg(long)]
    pub category: Category,
    /// Path to the content, same as root path for multi-file torrents.
    #[arg(long)]
    pub content_path: PathBuf,
    /// Path to the saved torrent directory.
    #[arg(long)]
    pub save_path: PathBuf,
    /// Number of files in the torrent.
    #[arg(long = "num-files", allow_negative_numbers = true)]
    pub number_of_files: i64,
    /// Torrent size in bytes.
    #[arg(long, allow_negative_numbers = true)]
    pub size: i64,
    /// Tracker used for this torrent.
    #[arg(long)]
    pub tracker: String,
    /// Info hash.
    #[arg(long)]
    pub hash: String,
    /// Root directory to output files.
    #[arg(long)]
    pub output_path: String,
    /// Work directory. Overrides the configuration file, which is then not read.
    #[arg(long)]
    pub work_path: Option<PathBuf>,
}

impl AddArgs {
    pub fn to_entry(&self) -> Entry {
        Entry {
            output_path: self.output_path.clone(),
            name: self.name.clone(),
            category: self.category,
            content_path: self.content_path.clone(),
            number_of_files: self.number_of_files,
            size: self.size,
            tracker: self.tracker.clone(),
            hash: self.hash.clone(),
            save_path: self.save_path.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Stop after this many jobs. Zero or negative means no limit.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub limit: i64,
    /// Log what would be copied without touching the library or the queue.
    #[arg(long)]
    pub dry_run: bool,
}
