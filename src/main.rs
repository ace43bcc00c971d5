use clap::Parser;
use std::process;
use trs398_processor::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    match commands::run(command) {
        Ok(()) => {
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("TRS-398 Processor - Ionization-Chamber Trial Analyzer");
    println!("=====================================================");
    println!();
    println!("Normalize repeated ionization-chamber measurement trials recorded as CSV");
    println!("files and reduce them to quality-control statistics for radiotherapy");
    println!("calibration workflows.");
    println!();
    println!("USAGE:");
    println!("    trs398-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    analyze         Analyze preliminary calibration trials (main command)");
    println!("    create-config   Create a configuration document with default settings");
    println!("    help            Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Create a configuration document:");
    println!("    trs398-processor create-config config.json");
    println!();
    println!("    # Analyze the trials in a samples directory:");
    println!("    trs398-processor analyze --input-dir samples --output-dir results \\");
    println!("                             --config config.json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    trs398-processor <COMMAND> --help");
}
