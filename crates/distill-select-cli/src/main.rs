//! distill-select CLI entry point.

use clap::{Parser, Subcommand};
use distill_select_cli::cli::{init_logging, styles, CommonArgs, OutputFormat};
use distill_select_cli::{pick, render_table, run, CliError, ConfigValidator, SelectConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "distill-select")]
#[command(about = "Pick the teacher snapshot that distills best")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run teacher selection
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Override selection.epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Override selection.save_interval
        #[arg(long)]
        save_interval: Option<usize>,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Apply the selection rule to precomputed losses
    Pick {
        /// Comma-separated losses, one per snapshot (nan/inf disqualify)
        #[arg(
            long,
            value_delimiter = ',',
            required = true,
            allow_negative_numbers = true
        )]
        losses: Vec<f32>,

        /// Epochs between snapshots, for reporting
        #[arg(long, default_value = "5")]
        save_interval: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.common);

    let result = match cli.command {
        Commands::Run {
            config,
            epochs,
            save_interval,
        } => run_command(&config, epochs, save_interval, &cli.common),
        Commands::Validate { config } => validate_command(&config, &cli.common),
        Commands::Pick {
            losses,
            save_interval,
        } => pick_command(&losses, save_interval, &cli.common),
    };

    if let Err(e) = result {
        if !cli.common.is_quiet() {
            eprintln!("{}", styles::error(&format!("[{}] {e}", e.code())));
        }
        std::process::exit(1);
    }
}

fn run_command(
    config_path: &Path,
    epochs: Option<usize>,
    save_interval: Option<usize>,
    common: &CommonArgs,
) -> distill_select_cli::Result<()> {
    if !common.is_quiet() && common.format == OutputFormat::Table {
        println!("{}", styles::header("distill-select"));
    }

    let mut config = SelectConfig::from_file(config_path)?;
    if let Some(epochs) = epochs {
        config.selection.epochs = epochs;
    }
    if let Some(interval) = save_interval {
        config.selection.save_interval = interval;
    }

    let result = run(&config)?;
    let report = &result.report;

    match common.format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Table => {
            print!("{}", render_table(&report.scores, report.best_index));
            if !common.is_quiet() {
                println!(
                    "\n{}",
                    styles::success(&format!(
                        "Selected snapshot {} (stage {}, {} epochs)",
                        report.best_index, report.best_stage, report.best_epochs
                    ))
                );
                if report.disqualified() > 0 {
                    println!(
                        "{}",
                        styles::info(&format!(
                            "{} snapshot(s) disqualified",
                            report.disqualified()
                        ))
                    );
                }
                println!("  Duration: {:.3}s", result.duration_seconds);
            }
        }
    }

    Ok(())
}

fn validate_command(config_path: &Path, common: &CommonArgs) -> distill_select_cli::Result<()> {
    let config = SelectConfig::from_file(config_path)?;
    ConfigValidator::validate(&config)?;

    if !common.is_quiet() {
        println!("{}", styles::success("Configuration valid"));
    }

    Ok(())
}

fn pick_command(
    losses: &[f32],
    save_interval: usize,
    common: &CommonArgs,
) -> distill_select_cli::Result<()> {
    let (scores, best) = pick(losses, save_interval)?;

    match common.format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "best_index": best,
                "scores": scores,
            });
            print_json(&value)?
        }
        OutputFormat::Table => print!("{}", render_table(&scores, best)),
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> distill_select_cli::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::Serialization {
        message: e.to_string(),
    })?;
    println!("{json}");
    Ok(())
}
