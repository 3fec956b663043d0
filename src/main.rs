use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gst_report::config::ReportConfig;
use gst_report::io::discover::discover_inputs;
use gst_report::{Result, ReportError, consolidate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ReportError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Consolidate(args) => execute_consolidate(args),
        Command::DefaultConfig(args) => execute_default_config(args),
    }
}

fn execute_consolidate(args: ConsolidateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::default(),
    };
    if args.filename_as_month {
        config.filename_as_month = true;
    }
    config.validate()?;

    let inputs = discover_inputs(&args.input_folder)?;
    if inputs.is_empty() {
        warn!(folder = %args.input_folder.display(), "no .xlsx files found");
    } else {
        info!(count = inputs.len(), "discovered input workbooks");
    }

    let output = consolidate::run(&inputs, &args.output_folder, &args.output_filename, &config)?;
    println!("{}", output.display());
    Ok(())
}

fn execute_default_config(args: DefaultConfigArgs) -> Result<()> {
    let json = ReportConfig::default().to_json_pretty()?;
    match args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate monthly GST return workbooks into one report."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sum every workbook in a folder into a single report.
    Consolidate(ConsolidateArgs),
    /// Print the built-in configuration as JSON.
    DefaultConfig(DefaultConfigArgs),
}

#[derive(clap::Args)]
struct ConsolidateArgs {
    /// Folder searched recursively for .xlsx input files.
    input_folder: PathBuf,

    /// Folder the report is written to.
    output_folder: PathBuf,

    /// Report file name, without the .xlsx extension.
    output_filename: String,

    /// JSON configuration replacing the built-in categories.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Label rows with the input file name instead of the return period cell.
    #[arg(long)]
    filename_as_month: bool,
}

#[derive(clap::Args)]
struct DefaultConfigArgs {
    /// Write the configuration to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}
