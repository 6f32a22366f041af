//! Log sink handed to the scanner and deleter
//!
//! The core never writes to a global handle. Callers pass a [`LogSink`];
//! [`TracingSink`] forwards to `tracing`, [`MemorySink`] keeps the lines
//! for a caller that displays them itself.

use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "DEPS_CLEANER_LOG";

/// Receiver of diagnostic lines. Called from worker threads.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, line: &str);
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn LogSink>;

/// Forwards every line to a `tracing` event of the same level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, line: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", line),
            Level::WARN => tracing::warn!("{}", line),
            Level::INFO => tracing::info!("{}", line),
            Level::DEBUG => tracing::debug!("{}", line),
            _ => tracing::trace!("{}", line),
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected lines.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .map(|l| l.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Number of lines logged at `level`.
    pub fn count(&self, level: Level) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, line)| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, line: &str) {
        let mut lines = match self.lines.lock() {
            Ok(l) => l,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push((level, line.to_string()));
    }
}

/// Default sink used when none is configured.
pub fn default_sink() -> SharedSink {
    Arc::new(TracingSink)
}

/// Map a `-v` count to a filter directive.
///
/// Warnings always pass so I/O failures during a clean stay visible.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install a stderr `fmt` subscriber.
///
/// `DEPS_CLEANER_LOG` overrides `default_filter` when set. Calling this twice
/// is harmless; the second install is ignored.
pub fn init_logger(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
