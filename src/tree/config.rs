//! Configuration shared by the traverser and the deleter

use std::num::NonZeroUsize;
use std::thread;

use crate::pattern::MatchMode;

/// Configuration for scanning and deletion.
#[derive(Debug, Clone, Default)]
pub struct CleanerConfig {
    /// Number of worker threads.
    /// 0 = auto-detect (one per logical core)
    /// N = use N worker threads
    pub workers: usize,
    /// What the traverser tests the pattern against.
    pub match_mode: MatchMode,
}

impl CleanerConfig {
    /// Resolved pool size, never zero.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }
}
