//! Core library for turning document-analysis results into report datasets.
//!
//! This crate provides:
//! - The analysis result model (key-value pairs, tables as flat cell lists, paragraphs)
//! - Table reconstruction and page-scoped field lookup (client, product, test date, address)
//! - Multi-page and multi-document aggregation into one [`DataTable`]
//! - A sequential batch orchestrator with pluggable source, analyzer, and store

pub mod batch;
pub mod error;
pub mod extract;
pub mod models;

pub use batch::{
    BatchEvent, BatchOrchestrator, BatchReport, DirectorySource, DocumentAnalyzer, DocumentError,
    DocumentSource, FileStore, JsonResultAnalyzer, ResultStore, Stage,
};
pub use error::{AnalysisError, ExtractionError, FormtabError, Result, StoreError};
pub use extract::{DataExtractor, PageFields};
pub use models::analysis::AnalysisResult;
pub use models::config::FormtabConfig;
pub use models::table::DataTable;
