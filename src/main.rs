//! CLI entry point for deps-cleaner

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use deps_cleaner::logging::{init_logger, verbosity_filter};
use deps_cleaner::{
    CleanerConfig, MatchMode, MatchPrinter, Mode, Session, print_summary, print_summary_json,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "deps-cleaner")]
#[command(about = "Find and remove dependency folders like node_modules")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Regex matched against the end of each directory name
    #[arg(short, long)]
    pattern: String,

    /// Delete matches instead of only listing them
    #[arg(short, long)]
    delete: bool,

    /// Number of worker threads (0 = one per core)
    #[arg(short = 'j', long = "jobs", default_value = "0")]
    jobs: usize,

    /// Match the pattern against the whole path instead of the directory name
    #[arg(long = "full-path")]
    full_path: bool,

    /// Output the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Do not print one line per match (warnings are still logged)
    #[arg(short, long)]
    quiet: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logger(verbosity_filter(args.verbose));

    let mode = if args.delete { Mode::Clean } else { Mode::Preview };
    let config = CleanerConfig {
        workers: args.jobs,
        match_mode: if args.full_path {
            MatchMode::FullPath
        } else {
            MatchMode::BaseName
        },
    };

    let session = match Session::new(&args.path, &args.pattern, mode) {
        Ok(s) => s.with_config(config),
        Err(e) => {
            eprintln!("deps-cleaner: {}", e);
            process::exit(1);
        }
    };

    let use_color = !args.json && should_use_color(args.color);
    let printer = MatchPrinter::new(mode, use_color);
    let print_lines = !args.json && !args.quiet;

    let summary = session.run(|path, update| {
        if print_lines {
            if let Err(e) = printer.print(path, update) {
                tracing::warn!("error writing output: {}", e);
            }
        }
    });

    let result = if args.json {
        print_summary_json(&summary)
    } else {
        print_summary(&summary, use_color)
    };

    if let Err(e) = result {
        eprintln!("deps-cleaner: error writing output: {}", e);
        process::exit(1);
    }
}
