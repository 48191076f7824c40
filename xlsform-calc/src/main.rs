use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use xlsform_core::{
    Anchor, CalculationRequest, InsertionReport, XlsFormConfig, XlsFormError, insert_calculation,
    logging, reader,
};

#[derive(Parser)]
#[command(name = "xlsform-calc")]
#[command(about = "Add a calculated field to an XLSForm survey sheet", long_about = None)]
#[command(after_help = "Examples:\n  \
    xlsform-calc forms/app/delivery.xlsx needs_urgent_pnc \"if(\\${risk}='high','yes','no')\"\n  \
    xlsform-calc delivery.xlsx needs_followup \"if(\\${referred}='yes','yes','no')\" --before=group_summary\n\n\
    Escape $ signs in the shell with \\$ or use single quotes around the calculation.")]
#[command(version)]
struct Cli {
    /// Path to the XLSForm (.xlsx) file
    #[arg(value_name = "XLSFORM")]
    xlsform: PathBuf,

    /// Name for the new calculated field
    #[arg(value_name = "FIELD_NAME")]
    field_name: String,

    /// XLSForm calculation formula
    #[arg(value_name = "CALCULATION", allow_hyphen_values = true)]
    calculation: String,

    /// Insert before this group (default: before the summary group or at the end)
    #[arg(long, value_name = "GROUP")]
    before: Option<String>,

    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripting
    Json,
}

#[derive(Serialize)]
struct Success<'a> {
    success: bool,
    #[serde(flatten)]
    report: &'a InsertionReport,
}

#[derive(Serialize)]
struct Failure<'a> {
    success: bool,
    error: String,
    kind: &'a str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = XlsFormConfig::load(cli.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    if !cli.xlsform.exists() {
        print_failure(&cli.format, &XlsFormError::FileNotFound(cli.xlsform.clone()))?;
        std::process::exit(1);
    }

    if !reader::has_xlsx_extension(&cli.xlsform) {
        eprintln!(
            "{}",
            format!(
                "WARNING: File does not have .xlsx extension: {}",
                cli.xlsform.display()
            )
            .yellow()
        );
    }

    let mut request = CalculationRequest::new(&cli.field_name, &cli.calculation);
    if let Some(group) = &cli.before {
        request = request.before(group);
    }

    if cli.dry_run {
        print_dry_run(&cli.xlsform, &request);
        return Ok(());
    }

    match insert_calculation(&cli.xlsform, &request, &config.inserter) {
        Ok(report) => {
            match cli.format {
                OutputFormat::Human => print_success(&cli.xlsform, &report),
                OutputFormat::Json => {
                    let output = Success {
                        success: true,
                        report: &report,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
            Ok(())
        }
        Err(err) => {
            print_failure(&cli.format, &err)?;
            std::process::exit(1);
        }
    }
}

fn print_dry_run(path: &Path, request: &CalculationRequest) {
    println!("DRY RUN - Would add calculation to {}:", path.display());
    println!("  Field name: {}", request.field_name);
    println!("  Calculation: {}", request.calculation);
    if let Some(group) = &request.before_group {
        println!("  Insert before: {}", group);
    }
}

fn print_success(path: &Path, report: &InsertionReport) {
    println!(
        "{}",
        format!("✓ Successfully added calculation to {}", report.file)
            .green()
            .bold()
    );
    println!("  Field: {}", report.field_name);
    println!("  Formula: {}", report.calculation);
    println!("  Inserted at row: {}", report.inserted_at_row);
    println!("  Placement: {}", describe_anchor(&report.anchor));
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Review the change in {}", path.display());

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    println!(
        "  2. Run: cht --local convert-app-forms upload-app-forms -- {}",
        stem
    );
}

fn print_failure(format: &OutputFormat, err: &XlsFormError) -> Result<()> {
    match format {
        OutputFormat::Human => println!("{}", format!("ERROR: {}", err).red()),
        OutputFormat::Json => {
            let output = Failure {
                success: false,
                error: err.to_string(),
                kind: err.kind(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn describe_anchor(anchor: &Anchor) -> String {
    match anchor {
        Anchor::Group(name) => format!("before group '{}'", name),
        Anchor::SummaryGroup(name) => format!("before summary group '{}'", name),
        Anchor::EndOfContent => "after the last survey row".to_string(),
    }
}
