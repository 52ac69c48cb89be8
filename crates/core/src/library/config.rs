//! Configuration for the library module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where processed content ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory receiving `<Name><ext>` movie files.
    pub movie_output_path: PathBuf,
    /// Directory holding one sub-directory per show.
    pub tv_output_path: PathBuf,
}

impl LibraryConfig {
    pub fn new(movie_output_path: impl Into<PathBuf>, tv_output_path: impl Into<PathBuf>) -> Self {
        Self {
            movie_output_path: movie_output_path.into(),
            tv_output_path: tv_output_path.into(),
        }
    }
}
