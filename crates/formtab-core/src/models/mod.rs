//! Data models: the analysis result consumed, the dataset produced, and configuration.

pub mod analysis;
pub mod config;
pub mod table;

pub use analysis::{AnalysisResult, BoundingRegion, Cell, CellKind, DocumentElement, KeyValuePair, Paragraph, TableElement};
pub use config::{BatchConfig, ColumnNames, DatasetFormat, ExtractionConfig, FormtabConfig, OutputConfig};
pub use table::{DataTable, Record};
