pub mod config;
pub mod driver;
pub mod entry;
pub mod heuristics;
pub mod library;
pub mod queue;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
};
pub use driver::{
    BackoffSchedule, DoneAction, DriverConfig, DriverError, DriverOutcome, QueueDriver,
    StopReason,
};
pub use entry::{Category, CategoryParseError, Entry};
pub use heuristics::{parse_tv_episode, parse_tv_season, HeuristicError, TvInfo};
pub use library::{
    copy_file, filter_files, CategoryProcessor, EntryProcessor, FileFilter, LibraryConfig,
    ProcessError,
};
pub use queue::{JobQueue, QueueError, WorkQueue};
