use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser, Debug)]
#[command(name = "goadapt")]
#[command(about = "Generate delegating Go adapter files that re-export packages under rule-derived names")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Input .go files, or directories to scan for files with //go:adapter: directives
    pub inputs: Vec<PathBuf>,

    /// Output file (one input) or existing directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (YAML, JSON or TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long)]
    pub quiet: bool,

    /// Print a diff of what would be written instead of writing
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            dry_run: self.dry_run,
        }
    }

    /// Default tracing filter for the verbosity count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
