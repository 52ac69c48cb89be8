//! Library module: files completed torrents into a movie/TV library.
//!
//! The [`CategoryProcessor`] dispatches on an entry's [`Category`] and copies
//! its content into place:
//!
//! - `MovieSingle`: one video plus at most one subtitle per extension
//! - `TvSingle`: one episode file into the show's directory
//! - `TvSeason`: every `.mkv` directly under the content directory
//! - `Ignore`: nothing
//!
//! Existing library files are never overwritten, and in dry-run mode nothing
//! on disk changes while all the checks still run.
//!
//! # Example
//!
//! ```ignore
//! use shelver_core::library::{CategoryProcessor, EntryProcessor, LibraryConfig};
//!
//! let processor = CategoryProcessor::new(
//!     LibraryConfig::new("/library/movies", "/library/tv"),
//!     false,
//! );
//! processor.process(&entry).await?;
//! ```
//!
//! [`Category`]: crate::entry::Category

mod config;
mod error;
mod files;
mod processor;
mod traits;

pub use config::LibraryConfig;
pub use error::ProcessError;
pub use files::{copy_file, extension_of, filter_files, FileFilter};
pub use processor::{CategoryProcessor, SUBTITLE_EXTENSIONS};
pub use traits::EntryProcessor;
