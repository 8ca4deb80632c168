//! mailkpi CLI - Correspondence Delivery-Indicator Reports
//!
//! Command-line interface for validating correspondence exports and
//! building the Excel delivery report.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "mailkpi")]
#[command(author, version, about = "Correspondence delivery-indicator reports", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a correspondence export
    Check {
        /// Input file path (semicolon-delimited CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Run the pipeline and write the Excel report
    Report {
        /// Input file path (semicolon-delimited CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output workbook path
        #[arg(short, long, default_value = "CORRESPONDENCIA.xlsx")]
        output: PathBuf,

        /// Run date (YYYY-MM-DD); defaults to today
        #[arg(long, value_name = "DATE")]
        run_date: Option<NaiveDate>,

        /// Write totals as plain values instead of live formulas
        #[arg(long)]
        no_formulas: bool,

        /// Skip chart embedding
        #[arg(long)]
        no_charts: bool,
    },

    /// Print the monthly indicator summary
    Summary {
        /// Input file path (semicolon-delimited CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Run date (YYYY-MM-DD); defaults to today
        #[arg(long, value_name = "DATE")]
        run_date: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; -v/-vv raise the default filter
    let filter = match cli.verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Check { file }) => commands::check(&file),
        Some(Commands::Report {
            file,
            output,
            run_date,
            no_formulas,
            no_charts,
        }) => commands::report(&file, &output, run_date, !no_formulas, !no_charts),
        Some(Commands::Summary {
            file,
            format,
            run_date,
        }) => commands::summary(&file, &format, run_date),
        None => {
            println!("mailkpi - Correspondence Delivery-Indicator Reports");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}
