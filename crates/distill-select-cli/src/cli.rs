//! Shared CLI arguments, output format and message styling.

use clap::{Args, ValueEnum};
use env_logger::{Builder, Env};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

/// Flags accepted by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl CommonArgs {
    /// Default `log` filter for these flags; `RUST_LOG` still wins.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

/// Initialise `env_logger` honouring `RUST_LOG` with a flag-derived default.
pub fn init_logging(args: &CommonArgs) {
    let env = Env::default().default_filter_or(args.log_filter());
    Builder::from_env(env).format_timestamp(None).init();
}

/// Message prefixes for terminal output.
pub mod styles {
    pub fn header(text: &str) -> String {
        format!("=== {text} ===")
    }

    pub fn success(text: &str) -> String {
        format!("✓ {text}")
    }

    pub fn info(text: &str) -> String {
        format!("ℹ {text}")
    }

    pub fn error(text: &str) -> String {
        format!("✗ {text}")
    }
}
