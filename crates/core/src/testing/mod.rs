//! Testing utilities and mock implementations.
//!
//! [`MockQueue`] and [`MockProcessor`] stand in for the work directory and the
//! library so the queue driver can be exercised without touching disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelver_core::testing::{fixtures, MockProcessor, MockQueue};
//!
//! let queue = MockQueue::new();
//! queue.push_entry(fixtures::entry("abc", "Foo 2020", Category::MovieSingle)).await;
//! queue.push_parse_error().await;
//!
//! let processor = MockProcessor::new();
//! processor.fail_hash("abc", || ProcessError::NoFiles { number_of_files: 0 }).await;
//! ```

mod mock_processor;
mod mock_queue;

pub use mock_processor::MockProcessor;
pub use mock_queue::{MockQueue, ScriptedNext};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::entry::{Category, Entry};

    /// Create a single-file entry with reasonable defaults.
    ///
    /// Content lives at `/downloads/<name>`; tests that touch disk override
    /// `content_path`.
    pub fn entry(hash: &str, name: &str, category: Category) -> Entry {
        Entry {
            output_path: "/library".to_string(),
            name: name.to_string(),
            category,
            content_path: PathBuf::from("/downloads").join(name),
            number_of_files: 1,
            size: 1024 * 1024 * 700, // 700 MB
            tracker: "udp://tracker.example.org:1337/announce".to_string(),
            hash: hash.to_string(),
            save_path: PathBuf::from("/downloads"),
        }
    }

    /// Create a season-pack entry with `episodes` files.
    pub fn season_entry(hash: &str, name: &str, episodes: i64) -> Entry {
        let mut entry = entry(hash, name, Category::TvSeason);
        entry.number_of_files = episodes;
        entry.size = episodes * 1024 * 1024 * 350;
        entry
    }
}
