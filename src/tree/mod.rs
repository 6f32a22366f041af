//! Directory tree scanning
//!
//! This module provides the two walks a cleaning run is built from:
//!
//! - `count`: sequential full walk estimating how many entries match
//! - `Traverser`: concurrent walk reporting topmost matching directories

mod config;
mod counter;
mod queue;
mod traverser;
mod utils;

pub use config::CleanerConfig;
pub use counter::count;
pub use traverser::{CancelToken, TraversalSummary, Traverser, traverse};
pub use utils::check_root;

pub(crate) use utils::{Child, list_children};
