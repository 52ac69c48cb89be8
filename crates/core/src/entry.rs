//! Job descriptors for completed torrents.
//!
//! An [`Entry`] is written by the `add` command when a torrent finishes and is
//! consumed by the processing loop. On disk it lives at `<work_dir>/<hash>.json`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Media category of a completed torrent. Decides how its files are filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A single movie, possibly with subtitles.
    MovieSingle,
    /// One TV episode in a single file.
    TvSingle,
    /// A whole season of `.mkv` episodes.
    TvSeason,
    /// Nothing to do.
    Ignore,
}

impl Category {
    /// All categories, in their legacy numeric order.
    pub const ALL: [Category; 4] = [
        Category::MovieSingle,
        Category::TvSingle,
        Category::TvSeason,
        Category::Ignore,
    ];

    /// Canonical name, as written to job files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MovieSingle => "MovieSingle",
            Category::TvSingle => "TvSingle",
            Category::TvSeason => "TvSeason",
            Category::Ignore => "Ignore",
        }
    }

    /// Looks up the legacy integer encoding used by older job producers.
    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{value}', expected one of: MovieSingle, TvSingle, TvSeason, Ignore")]
pub struct CategoryParseError {
    pub value: String,
}

impl FromStr for Category {
    type Err = CategoryParseError;

    /// Case-insensitive lookup by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CategoryParseError {
                value: s.to_string(),
            })
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryVisitor;

        impl Visitor<'_> for CategoryVisitor {
            type Value = Category;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a category name or its numeric index")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Category, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Category, E> {
                Category::from_index(v)
                    .ok_or_else(|| E::custom(format!("category index {} out of range", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Category, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(Category::from_index)
                    .ok_or_else(|| E::custom(format!("category index {} out of range", v)))
            }
        }

        deserializer.deserialize_any(CategoryVisitor)
    }
}

/// A completed torrent waiting to be filed into the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entry {
    /// Root of the library instance this torrent was meant for.
    pub output_path: String,
    /// Raw torrent name.
    pub name: String,
    pub category: Category,
    /// Downloaded content: a directory for multi-file torrents, else a file.
    pub content_path: PathBuf,
    pub number_of_files: i64,
    /// Size in bytes.
    pub size: i64,
    pub tracker: String,
    /// Info hash. Unique key of the job.
    pub hash: String,
    pub save_path: PathBuf,
}

impl Entry {
    /// File name this entry must be stored under.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.hash)
    }
}
