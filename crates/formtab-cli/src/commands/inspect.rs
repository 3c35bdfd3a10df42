//! Inspect command - show fields and tables of a single analysis result.

use std::fs::File;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{info, warn};

use formtab_core::models::config::{DatasetFormat, FormtabConfig};
use formtab_core::{
    AnalysisResult, DataExtractor, DataTable, DocumentAnalyzer, ExtractionError, JsonResultAnalyzer,
    PageFields,
};

use super::output::render;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Analysis result file (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: InspectFormat,

    /// Only this page
    #[arg(short, long)]
    page: Option<u32>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum InspectFormat {
    /// Human-readable summary
    Text,
    /// Fields, address, and table as JSON
    Json,
    /// Table only, as CSV
    Csv,
}

#[derive(Serialize)]
struct Inspection<'a> {
    address: Option<String>,
    pages: Vec<PageFields>,
    table: &'a DataTable,
}

pub fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Inspecting {}", args.input.display());

    let mut file = File::open(&args.input)?;
    let raw = JsonResultAnalyzer.analyze(&mut file)?;
    let result = AnalysisResult::from_value(raw)?;
    let extractor = DataExtractor::new(&result).with_config(&config.extraction);

    let pages = match args.page {
        Some(page) => vec![page],
        None => result.page_numbers(),
    };

    let table = match args.page {
        Some(page) => extractor.extract_table(page).map(Option::unwrap_or_default),
        None => extractor.extract_tables(),
    };

    match args.format {
        InspectFormat::Csv => {
            print!("{}", render(&table?, DatasetFormat::Csv, config.output.csv_delimiter)?);
        }
        InspectFormat::Json => {
            let table = table?;
            let inspection = Inspection {
                address: extractor.extract_address(),
                pages: pages
                    .iter()
                    .map(|&page| extractor.page_fields(page))
                    .collect::<Result<_, _>>()?,
                table: &table,
            };
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
        InspectFormat::Text => print_text(&extractor, &pages, table, &config),
    }

    Ok(())
}

fn print_text(
    extractor: &DataExtractor<'_>,
    pages: &[u32],
    table: Result<DataTable, ExtractionError>,
    config: &FormtabConfig,
) {
    match extractor.extract_address() {
        Some(address) => println!("Address: {}", address),
        None => println!("Address: {}", style("not found").yellow()),
    }
    println!();

    for &page in pages {
        println!("{}", style(format!("Page {}", page)).bold());
        println!("  Client:    {}", extractor.client_name(page).unwrap_or("-"));
        println!("  Product:   {}", extractor.product_name(page).unwrap_or("-"));
        match extractor.test_date(page) {
            Ok(Some(date)) => println!("  Test date: {}", date.format(&config.extraction.date_format)),
            Ok(None) => println!("  Test date: -"),
            Err(e) => {
                warn!("{}", e);
                println!("  Test date: {}", style(e).red());
            }
        }
        match extractor.find_table(page) {
            Some(element) => println!("  Table:     {} cells", element.cells.len()),
            None => println!("  Table:     none"),
        }
    }

    println!();
    let table = match table {
        Ok(table) => table,
        Err(e) => {
            println!("{} No table: {}", style("✗").red(), e);
            return;
        }
    };
    println!(
        "{} {} rows x {} columns",
        style("ℹ").blue(),
        table.len(),
        table.columns().len()
    );
    if !table.is_empty() {
        println!("  {}", table.columns().join(" | "));
        for row in table.rows() {
            let values: Vec<&str> = row.iter().map(|v| v.as_deref().unwrap_or("")).collect();
            println!("  {}", values.join(" | "));
        }
    }

    let malformed = table.malformed_rows();
    if !malformed.is_empty() {
        println!(
            "{} rows {:?} do not match the column count",
            style("!").yellow(),
            malformed
        );
    }
}
