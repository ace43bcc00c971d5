//! Command implementations for the TRS-398 processor CLI
//!
//! This module contains the command execution logic, logging setup, and
//! console reporting for the CLI interface.

use crate::cli::args::{AnalyzeArgs, Commands, CreateConfigArgs};
use crate::config::Config;
use crate::services::aggregator::{self, AnalysisRequest, AnalysisStats};
use crate::{Error, Result};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Main command runner for the TRS-398 processor
///
/// Dispatches to the appropriate subcommand handler:
/// - `analyze`: trial normalization and statistical reduction
/// - `create-config`: write the default configuration document
pub fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::CreateConfig(args) => run_create_config(args),
    }
}

/// Analyze command runner
///
/// Orchestrates one analysis run:
/// 1. Set up logging and load the configuration document
/// 2. Validate arguments and prepare the output directory
/// 3. Run the aggregation pipeline with progress reporting
/// 4. Print the cross-trial summary
fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    setup_logging(&args);

    info!("Starting TRS-398 processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;

    let request = AnalysisRequest {
        input_dir: args.input_dir.clone(),
        output_dir: args.output_dir.clone(),
        input_prefix: args
            .input_prefix
            .clone()
            .unwrap_or_else(|| config.files.input.prefix.clone()),
        output_prefix: args
            .output_prefix
            .clone()
            .unwrap_or_else(|| config.files.output.prefix.clone()),
        filetype: args
            .filetype
            .clone()
            .unwrap_or_else(|| config.files.input.extension.clone()),
        summary_filename: args
            .summary
            .clone()
            .unwrap_or_else(|| config.files.summary.file_name()),
        show_progress: args.show_progress(),
    };

    prepare_output_directory(&request.output_dir)?;

    let stats = aggregator::run_analysis(&request, &config)?;
    report_analysis(&stats);
    Ok(())
}

/// Create-config command runner
fn run_create_config(args: CreateConfigArgs) -> Result<()> {
    if args.filename.exists() {
        return Err(Error::configuration(format!(
            "File already exists: {}. Choose a different name or delete the existing file.",
            args.filename.display()
        )));
    }

    Config::default().save(&args.filename)?;
    println!("Config file {} created.", args.filename.display());
    Ok(())
}

/// Set up structured logging for the analyze command
fn setup_logging(args: &AnalyzeArgs) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trs398_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Resolve and load the configuration document (explicit path or the
/// user configuration directory)
fn load_configuration(args: &AnalyzeArgs) -> Result<Config> {
    let config_path: PathBuf = match &args.config_file {
        Some(path) => path.clone(),
        None => {
            let default_path = Config::default_config_path()?;
            if !default_path.exists() {
                return Err(Error::configuration(format!(
                    "No config file given and none found at '{}'. \
                     Run 'trs398-processor create-config' or pass --config.",
                    default_path.display()
                )));
            }
            default_path
        }
    };

    info!("Using config file: {}", config_path.display());
    Config::load(&config_path)
}

/// Create the output directory if it does not exist
fn prepare_output_directory(output_dir: &std::path::Path) -> Result<()> {
    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            Error::io(
                format!(
                    "Failed to create output directory '{}'",
                    output_dir.display()
                ),
                e,
            )
        })?;
        info!("Created output directory: {}", output_dir.display());
    }
    Ok(())
}

/// Print the run outcome to the console
fn report_analysis(stats: &AnalysisStats) {
    let Some(summary) = &stats.summary else {
        println!("{}", "Cannot find input files.".bright_yellow());
        return;
    };

    println!(
        "{}",
        format!(
            "General statistical quantities ({} trials, {} readings):",
            stats.trials_processed, stats.records_processed
        )
        .bright_green()
        .bold()
    );
    println!("  {} {:.3}", "Average:".bright_cyan(), summary.average);
    println!(
        "  {} {:.3}",
        "Standard deviation:".bright_cyan(),
        summary.std_dev
    );
    println!(
        "  {} {:.3}",
        "Expected value:".bright_cyan(),
        summary.expected_value
    );
    println!(
        "  {} {}",
        "Output files:".bright_cyan(),
        stats.output_files.len()
    );
    println!("{}", "Preliminary analysis done.".bright_green());
}
