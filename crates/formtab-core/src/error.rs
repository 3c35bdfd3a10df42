//! Error types for the formtab-core library.

use thiserror::Error;

/// Main error type for the formtab library.
#[derive(Error, Debug)]
pub enum FormtabError {
    /// Hard extraction failure (malformed test date).
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Document analysis boundary failure.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Persistence failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Hard failures raised while extracting fields from an analysis result.
///
/// Text lookups never fail; only the test date does.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The date-time value does not start with a `D/M/YYYY H:MM` fragment.
    #[error("page {page}: no date-time fragment in {value:?}")]
    DateFragmentMissing { page: u32, value: String },

    /// The fragment was found but could not be parsed, even without the meridiem marker.
    #[error("page {page}: cannot parse date-time {fragment:?}: {reason}")]
    DateParse {
        page: u32,
        fragment: String,
        reason: String,
    },
}

/// Errors at the document analysis boundary.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The analysis service rejected or failed the request.
    #[error("analysis service failed: {0}")]
    Service(String),

    /// Reading the document stream failed.
    #[error("failed to read document: {0}")]
    Read(#[from] std::io::Error),

    /// The returned structure does not match the analysis result schema.
    #[error("malformed analysis result: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Errors from the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to write a raw result or checkpoint.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the checkpoint back.
    #[error("failed to read checkpoint {path}: {reason}")]
    Checkpoint { path: String, reason: String },

    /// Failed to serialize the data being stored.
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for the formtab library.
pub type Result<T> = std::result::Result<T, FormtabError>;
