//! Configuration structures for extraction and batch runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for formtab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormtabConfig {
    /// Extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch run configuration.
    pub batch: BatchConfig,

    /// Dataset output configuration.
    pub output: OutputConfig,
}

/// Names of the synthetic columns added to every extracted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Client name column.
    pub client: String,

    /// Product name column.
    pub product: String,

    /// Test date column.
    pub test_date: String,

    /// Source page number column.
    pub page: String,

    /// Source file column (batch runs only).
    pub source_file: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            client: "CLIENTE".to_string(),
            product: "PRODUCTO".to_string(),
            test_date: "FECHA".to_string(),
            page: "NUM PAGINA".to_string(),
            source_file: "ARCHIVO".to_string(),
        }
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Enrichment column names.
    pub columns: ColumnNames,

    /// chrono format used to render the test date in the dataset.
    pub date_format: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

/// Batch run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File extensions picked up from the input directory (case-insensitive).
    pub input_extensions: Vec<String>,

    /// Directory receiving one raw result JSON per document.
    pub results_dir: PathBuf,

    /// Directory receiving the checkpoint file.
    pub log_dir: PathBuf,

    /// Suffix appended to the file stem to name the source document.
    pub source_suffix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_extensions: vec!["json".to_string()],
            results_dir: PathBuf::from("results"),
            log_dir: PathBuf::from("var"),
            source_suffix: ".pdf".to_string(),
        }
    }
}

/// Dataset output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Csv,
    Json,
}

/// Dataset output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default dataset format.
    pub format: DatasetFormat,

    /// CSV field delimiter.
    pub csv_delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: DatasetFormat::Csv,
            csv_delimiter: ',',
        }
    }
}

impl FormtabConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
