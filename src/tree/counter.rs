//! Match counter used to estimate the work of a run
//!
//! Walks the whole tree once, sequentially, and counts every entry (file or
//! directory) whose base name matches. Matched directories are descended
//! into, so nested occurrences count too.

use std::path::Path;

use ignore::WalkBuilder;

use crate::error::Result;
use crate::pattern::Pattern;

use super::utils::check_root;

/// Count entries under `root` whose base name matches `pattern`.
///
/// The root itself is not counted. The first walk error aborts the count;
/// a caller should read that as "unknown", not "none found".
pub fn count(root: &Path, pattern: &Pattern) -> Result<usize> {
    check_root(root)?;

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false)
        .build();

    let mut count = 0;
    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        if pattern.matches_name(entry.file_name()) {
            count += 1;
        }
    }

    Ok(count)
}
