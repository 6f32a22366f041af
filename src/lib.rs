//! deps-cleaner - find and remove dependency folders such as `node_modules`
//!
//! The crate exposes three building blocks and a session that composes them:
//!
//! - [`count`]: sequential walk estimating how many entries match
//! - [`Traverser`]: concurrent walk reporting topmost matching directories
//! - [`Deleter`]: best-effort, bottom-up removal of one matched directory

pub mod delete;
pub mod error;
pub mod logging;
pub mod output;
pub mod pattern;
pub mod progress;
pub mod session;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use delete::{DeleteReport, Deleter, delete};
pub use error::{CleanError, Result};
pub use logging::{LogSink, MemorySink, SharedSink, TracingSink};
pub use output::{MatchPrinter, print_summary, print_summary_json};
pub use pattern::{MatchMode, Pattern};
pub use progress::{Progress, ProgressUpdate};
pub use session::{CleanSummary, Mode, Session};
pub use tree::{CancelToken, CleanerConfig, TraversalSummary, Traverser, count, traverse};
