//! Work queue of pending jobs.
//!
//! Jobs are plain JSON files named `<hash>.json` inside a work directory,
//! dropped there by the `add` command. [`WorkQueue`] serves them oldest
//! modification time first.
//!
//! A file whose name disagrees with the hash inside it is *poisoned*: it is
//! reported once and then skipped for the rest of the run. A file that does not
//! parse is reported as a retryable error and served again on the next poll.

mod error;
mod traits;
mod work_queue;

pub use error::QueueError;
pub use traits::JobQueue;
pub use work_queue::WorkQueue;
