//! Dataset serialization shared by the commands.

use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use tracing::debug;

use formtab_core::models::config::DatasetFormat;
use formtab_core::DataTable;

/// Output format flag for datasets.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    /// CSV with a header row
    Csv,
    /// JSON array of records
    Json,
}

impl From<FormatArg> for DatasetFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => DatasetFormat::Csv,
            FormatArg::Json => DatasetFormat::Json,
        }
    }
}

/// Render a dataset as CSV. Missing values are written as empty fields.
pub fn to_csv(table: &DataTable, delimiter: char) -> anyhow::Result<String> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| anyhow::anyhow!("CSV delimiter must be a single ASCII character"))?;

    // Malformed rows keep their own width.
    let mut wtr = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(vec![]);

    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|value| value.as_deref().unwrap_or("")))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Render a dataset in `format`.
pub fn render(table: &DataTable, format: DatasetFormat, delimiter: char) -> anyhow::Result<String> {
    match format {
        DatasetFormat::Csv => to_csv(table, delimiter),
        DatasetFormat::Json => Ok(serde_json::to_string_pretty(table)?),
    }
}

/// Write a dataset to `path`, or to stdout when no path is given.
pub fn write_dataset(
    table: &DataTable,
    format: DatasetFormat,
    delimiter: char,
    path: Option<&Path>,
) -> anyhow::Result<()> {
    let content = render(table, format, delimiter)?;

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
            debug!("Wrote dataset to {}", path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}
