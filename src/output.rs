//! Terminal and JSON output for cleaning runs

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::progress::ProgressUpdate;
use crate::session::{CleanSummary, Mode};

fn color_choice(use_color: bool) -> ColorChoice {
    if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Prints one line per match. Safe to share across worker threads.
pub struct MatchPrinter {
    out: Mutex<StandardStream>,
    mode: Mode,
}

impl MatchPrinter {
    pub fn new(mode: Mode, use_color: bool) -> Self {
        Self {
            out: Mutex::new(StandardStream::stdout(color_choice(use_color))),
            mode,
        }
    }

    pub fn print(&self, path: &Path, update: ProgressUpdate) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        let mut dim = ColorSpec::new();
        dim.set_dimmed(true);
        out.set_color(&dim)?;
        write!(out, "{} ", format_progress(update))?;

        let mut verb = ColorSpec::new();
        match self.mode {
            Mode::Preview => verb.set_fg(Some(Color::Cyan)),
            Mode::Clean => verb.set_fg(Some(Color::Red)),
        };
        out.set_color(&verb)?;
        write!(out, "{}", verb_for(self.mode))?;
        out.reset()?;
        writeln!(out, " {}", path.display())
    }
}

fn verb_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Preview => "Found",
        Mode::Clean => "Deleting",
    }
}

/// `[3/8  37%]`, or `[3/?]` when the estimate is unknown.
pub fn format_progress(update: ProgressUpdate) -> String {
    match update.percent() {
        Some(pct) => format!("[{}/{} {:>3}%]", update.index, update.total, pct),
        None => format!("[{}/?]", update.index),
    }
}

/// Print the end-of-run summary to stdout with optional color.
pub fn print_summary(summary: &CleanSummary, use_color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(use_color));

    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    stdout.set_color(&bold)?;
    writeln!(stdout, "{}", summary.message())?;
    stdout.reset()?;

    writeln!(stdout, "Matched:      {}", format_number(summary.matched))?;
    writeln!(stdout, "Estimated:    {}", format_number(summary.estimate))?;
    writeln!(stdout, "Scanned:      {} directories", format_number(summary.dirs_scanned))?;

    if let Some(deleted) = &summary.deleted {
        writeln!(
            stdout,
            "Removed:      {} files, {} directories ({})",
            format_number(deleted.files_removed),
            format_number(deleted.dirs_removed),
            format_size(deleted.bytes_freed)
        )?;
        if deleted.failures > 0 {
            let mut warn = ColorSpec::new();
            warn.set_fg(Some(Color::Yellow));
            stdout.set_color(&warn)?;
            writeln!(stdout, "Failed:       {} entries", format_number(deleted.failures))?;
            stdout.reset()?;
        }
    }

    if summary.read_errors > 0 {
        writeln!(stdout, "Unreadable:   {} directories", format_number(summary.read_errors))?;
    }

    Ok(())
}

/// Print the summary as JSON.
pub fn print_summary_json(summary: &CleanSummary) -> io::Result<()> {
    let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

/// Format a size in bytes to human-readable format.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format a number with thousand separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
