//! Command-line argument definitions for the TRS-398 processor
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::{Error, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the TRS-398 trial processor
///
/// Normalizes repeated ionization-chamber measurement trials recorded as
/// CSV files and reduces them to quality-control statistics for
/// radiotherapy calibration workflows.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "trs398-processor",
    version,
    about = "Normalize ionization-chamber calibration trials and compute quality-control statistics",
    long_about = "A tool that processes repeated ionization-chamber measurement trials recorded \
                  as CSV files: converts each reading into the schema's canonical unit system, \
                  derives the temperature-pressure correction factor and corrected charge per \
                  reading, and aggregates per-trial and cross-trial statistics for calibration \
                  quality-control reporting."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the TRS-398 processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Analyze preliminary calibration measurement trials (main command)
    Analyze(AnalyzeArgs),
    /// Create a configuration document with default settings
    CreateConfig(CreateConfigArgs),
}

/// Arguments for the analyze command (main data processing)
#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    /// Directory holding the trial input files
    ///
    /// Only regular files directly inside this directory are considered;
    /// matching is by filename prefix and file type. Trials are processed
    /// in lexical filename order.
    #[arg(
        short = 'i',
        long = "input-dir",
        value_name = "PATH",
        help = "Path of the input file directory"
    )]
    pub input_dir: PathBuf,

    /// Directory receiving the per-trial output files and the summary
    ///
    /// Created if it does not exist.
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "PATH",
        help = "Path of the output file directory"
    )]
    pub output_dir: PathBuf,

    /// Filename prefix an input file must carry to be analyzed
    ///
    /// Defaults to the input prefix declared in the configuration document.
    #[arg(
        long = "input-prefix",
        value_name = "PREFIX",
        help = "Input filename prefix"
    )]
    pub input_prefix: Option<String>,

    /// Prefix prepended to each per-trial output filename
    ///
    /// Defaults to the output prefix declared in the configuration document.
    #[arg(
        long = "output-prefix",
        value_name = "PREFIX",
        help = "Output filename prefix"
    )]
    pub output_prefix: Option<String>,

    /// File type (extension without dot) of the input and output files
    ///
    /// Defaults to the extension declared in the configuration document.
    #[arg(
        long = "filetype",
        value_name = "EXT",
        help = "File type of the input and output files"
    )]
    pub filetype: Option<String>,

    /// Filename of the JSON summary artifact
    ///
    /// Defaults to the summary filename declared in the configuration
    /// document.
    #[arg(long = "summary", value_name = "FILE", help = "Summary filename")]
    pub summary: Option<String>,

    /// Path to the configuration document
    ///
    /// JSON document carrying the quantity schema, file naming, and the
    /// correction-factor limit. If not specified, looks for the document
    /// in the user configuration directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Suppress the progress bar and non-essential output
    #[arg(short = 'q', long = "quiet", help = "Suppress non-essential output")]
    pub quiet: bool,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, help = "Increase logging verbosity")]
    pub verbose: u8,
}

impl AnalyzeArgs {
    /// Validate argument consistency before processing starts
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            return Err(Error::configuration(format!(
                "Input directory does not exist: {}",
                self.input_dir.display()
            )));
        }

        if let Some(filetype) = &self.filetype {
            if filetype.starts_with('.') || filetype.is_empty() {
                return Err(Error::configuration(format!(
                    "File type must be a bare extension without the dot, got '{}'",
                    filetype
                )));
            }
        }

        Ok(())
    }

    /// Map verbosity flags to a tracing filter level
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Whether to render the trial progress bar
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Arguments for the create-config command
#[derive(Debug, Clone, Parser)]
pub struct CreateConfigArgs {
    /// Destination filename for the configuration document
    #[arg(value_name = "FILENAME")]
    pub filename: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn analyze_args(input_dir: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            input_dir,
            output_dir: PathBuf::from("out"),
            input_prefix: None,
            output_prefix: None,
            filetype: None,
            summary: None,
            config_file: None,
            quiet: false,
            verbose: 0,
        }
    }

    #[test]
    fn test_validate_accepts_existing_input_dir() {
        let dir = TempDir::new().unwrap();
        let args = analyze_args(dir.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_input_dir() {
        let args = analyze_args(PathBuf::from("/definitely/not/a/real/dir"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dotted_filetype() {
        let dir = TempDir::new().unwrap();
        let mut args = analyze_args(dir.path().to_path_buf());
        args.filetype = Some(".csv".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level_mapping() {
        let dir = TempDir::new().unwrap();
        let mut args = analyze_args(dir.path().to_path_buf());
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "warn");
    }

    #[test]
    fn test_cli_parses_analyze_command() {
        let args = Args::parse_from([
            "trs398-processor",
            "analyze",
            "--input-dir",
            "samples",
            "--output-dir",
            "out",
            "--config",
            "config.json",
        ]);
        match args.command {
            Some(Commands::Analyze(analyze)) => {
                assert_eq!(analyze.input_dir, PathBuf::from("samples"));
                assert_eq!(analyze.config_file, Some(PathBuf::from("config.json")));
            }
            _ => panic!("expected analyze subcommand"),
        }
    }
}
