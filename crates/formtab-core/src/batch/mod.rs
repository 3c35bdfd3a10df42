//! Batch processing of many documents into one dataset.
//!
//! The orchestrator talks to three collaborators through traits: a
//! [`DocumentSource`] that enumerates and opens input documents, a
//! [`DocumentAnalyzer`] that turns a document stream into a raw analysis
//! result, and a [`ResultStore`] that persists raw results and a checkpoint.

mod fs;
mod orchestrator;

pub use fs::{DirectorySource, FileStore, JsonResultAnalyzer, CHECKPOINT_FILE};
pub use orchestrator::BatchOrchestrator;

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, StoreError};
use crate::models::table::DataTable;

/// Enumerates input documents in a stable order.
pub trait DocumentSource {
    /// Names of all documents, in processing order.
    fn list(&self) -> std::io::Result<Vec<String>>;

    /// Open a document for reading.
    fn open(&self, name: &str) -> std::io::Result<Box<dyn Read>>;
}

/// The document analysis boundary.
pub trait DocumentAnalyzer {
    /// Analyze one document and return the raw result structure.
    fn analyze(&self, document: &mut dyn Read) -> Result<serde_json::Value, AnalysisError>;
}

/// Durable storage for raw results and the batch checkpoint.
pub trait ResultStore {
    /// Store the raw result of one document under `stem`.
    fn store_result(&self, stem: &str, result: &serde_json::Value) -> Result<(), StoreError>;

    /// Overwrite the checkpoint with the list of processed documents.
    fn store_checkpoint(&self, processed: &[String]) -> Result<(), StoreError>;

    /// Processed documents recorded by a previous run, empty if none.
    fn load_checkpoint(&self) -> Result<Vec<String>, StoreError>;
}

/// Where in the per-document pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Opening the document stream.
    Open,
    /// The analysis boundary call.
    Analysis,
    /// Persisting the raw result or checkpoint.
    Persist,
    /// Converting the raw result into the analysis schema.
    Schema,
    /// Extracting tables (malformed test date).
    Extraction,
}

/// One failed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentError {
    /// Document name as listed by the source.
    pub file: String,
    /// Source identifier the document's rows would have carried.
    pub source_id: String,
    pub stage: Stage,
    /// Error description.
    pub error: String,
    /// Underlying causes, outermost first.
    pub trace: Vec<String>,
}

impl DocumentError {
    pub fn new(
        file: impl Into<String>,
        source_id: impl Into<String>,
        stage: Stage,
        error: &(dyn std::error::Error + 'static),
    ) -> Self {
        let mut trace = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push(cause.to_string());
            source = cause.source();
        }

        Self {
            file: file.into(),
            source_id: source_id.into(),
            stage,
            error: error.to_string(),
            trace,
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Rows of every successfully extracted document, in processing order.
    pub dataset: DataTable,
    /// Source identifiers of documents analyzed in this run.
    pub processed: Vec<String>,
    /// Failed documents.
    pub errors: Vec<DocumentError>,
    /// Source identifiers skipped because a checkpoint listed them.
    pub skipped: Vec<String>,
}

impl BatchReport {
    /// Documents that contributed to the dataset (or had no rows to add).
    pub fn succeeded(&self) -> usize {
        self.processed
            .iter()
            .filter(|id| !self.errors.iter().any(|e| &e.source_id == *id))
            .count()
    }
}

/// Progress notifications from a batch run.
#[derive(Debug, Clone, Copy)]
pub enum BatchEvent<'a> {
    /// The document list is known.
    Listed { total: usize },
    /// A document is about to be processed.
    Started { name: &'a str, index: usize },
    /// A document finished; `rows` is `None` on failure.
    Finished { name: &'a str, rows: Option<usize> },
    /// A document was skipped (already in the checkpoint).
    Skipped { name: &'a str },
}
