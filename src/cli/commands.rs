//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "txp-migrate")]
#[command(about = "Migrate Textpattern articles to Jekyll posts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite database holding the Textpattern tables
    #[arg(short, long, value_name = "FILE")]
    pub database: PathBuf,

    /// Textpattern base directory (for config.php and images)
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Site root to write into (default: current directory)
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// TOML file overriding output directories and image URLs
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report what would be written without touching the file system
    #[arg(long)]
    pub dry_run: bool,

    /// Show debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
