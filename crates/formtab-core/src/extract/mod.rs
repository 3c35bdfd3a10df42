//! Field and table extraction from analysis results.

mod extractor;
pub mod rules;
pub mod table;

pub use extractor::{DataExtractor, PageFields};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
