use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use xlsform_core::{XlsFormConfig, XlsFormError, analyze, logging, reader};

mod formatter;

#[derive(Parser)]
#[command(name = "xlsform-read")]
#[command(about = "Summarize the fields, groups and choice lists of an XLSForm", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the XLSForm file
    #[arg(value_name = "XLSFORM")]
    xlsform: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = XlsFormConfig::load(cli.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    if let Err(err) = reader::ensure_exists(&cli.xlsform) {
        formatter::print_error(&err.to_string(), cli.json)?;
        std::process::exit(1);
    }

    if !reader::has_xlsx_extension(&cli.xlsform) {
        eprintln!(
            "WARNING: File does not have .xlsx extension: {}",
            cli.xlsform.display()
        );
    }

    match analyze(&cli.xlsform, &config.analyzer) {
        Ok(summary) if cli.json => formatter::print_json(&summary)?,
        Ok(summary) => formatter::print_text(&summary, &config.analyzer.preview)?,
        // The file exists, so anything else is reported but not fatal
        Err(err @ XlsFormError::FileNotFound(_)) => {
            formatter::print_error(&err.to_string(), cli.json)?;
            std::process::exit(1);
        }
        Err(err) => formatter::print_error(&err.to_string(), cli.json)?,
    }

    Ok(())
}

