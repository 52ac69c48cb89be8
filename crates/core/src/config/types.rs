use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::driver::DriverConfig;
use crate::library::LibraryConfig;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding pending job files.
    pub work_path: PathBuf,
    /// Library root for single movies.
    pub movie_output_path: PathBuf,
    /// Library root for TV shows. One subdirectory per show.
    pub tv_output_path: PathBuf,
    /// Seconds to wait after finding the queue empty.
    #[serde(default = "default_dormant_period_secs")]
    pub dormant_period_secs: u64,
    /// Retries for unreadable job files. Negative means unlimited.
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
}

fn default_dormant_period_secs() -> u64 {
    30
}

fn default_max_retries() -> i32 {
    5
}

impl Config {
    /// Every path field that must point at an existing directory.
    pub fn path_fields(&self) -> [(&'static str, &Path); 3] {
        [
            ("work_path", &self.work_path),
            ("movie_output_path", &self.movie_output_path),
            ("tv_output_path", &self.tv_output_path),
        ]
    }

    pub fn dormant_period(&self) -> Duration {
        Duration::from_secs(self.dormant_period_secs)
    }

    /// Library destinations for the category processor.
    pub fn library(&self) -> LibraryConfig {
        LibraryConfig::new(&self.movie_output_path, &self.tv_output_path)
    }

    /// Driver settings derived from this configuration. Limit and dry run are
    /// left at their defaults; they come from the command line.
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::default()
            .with_dormant_period(self.dormant_period())
            .with_max_retries(self.max_retries)
    }
}
