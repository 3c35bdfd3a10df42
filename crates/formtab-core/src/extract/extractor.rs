//! Page-scoped extraction over one analysis result.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::analysis::{AnalysisResult, TableElement};
use crate::models::config::{ColumnNames, ExtractionConfig};
use crate::models::table::DataTable;

use super::Result;
use super::rules::{self, CLIENT_LABEL, DATE_TIME_LABEL, PRODUCT_LABEL};
use super::table::reconstruct;

/// Per-page field values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageFields {
    pub page: u32,
    pub client: Option<String>,
    pub product: Option<String>,
    pub test_date: Option<NaiveDateTime>,
}

/// Extracts fields and tables from a borrowed [`AnalysisResult`].
///
/// All operations are read-only and may be called in any order.
pub struct DataExtractor<'a> {
    result: &'a AnalysisResult,
    columns: ColumnNames,
    date_format: String,
}

impl<'a> DataExtractor<'a> {
    /// Create an extractor with the default column names.
    pub fn new(result: &'a AnalysisResult) -> Self {
        let config = ExtractionConfig::default();
        Self {
            result,
            columns: config.columns,
            date_format: config.date_format,
        }
    }

    /// Use column names and date format from `config`.
    pub fn with_config(mut self, config: &ExtractionConfig) -> Self {
        self.columns = config.columns.clone();
        self.date_format = config.date_format.clone();
        self
    }

    /// Value of the first key-value pair on `page` whose key matches `pattern`.
    ///
    /// The key is matched case-insensitively. Returns `None` when no pair
    /// matches; an absent value side yields `Some("")`.
    pub fn field_by_pattern(&self, page: u32, pattern: &Regex) -> Option<&'a str> {
        self.result
            .key_value_pairs
            .iter()
            .find(|kv| {
                kv.key.page_number() == Some(page)
                    && pattern.is_match(&kv.key.content.to_lowercase())
            })
            .map(|kv| kv.value_content())
    }

    /// Client name (`Cliente/Client` label).
    pub fn client_name(&self, page: u32) -> Option<&'a str> {
        self.field_by_pattern(page, &CLIENT_LABEL)
    }

    /// Product name (`Producto` label).
    pub fn product_name(&self, page: u32) -> Option<&'a str> {
        self.field_by_pattern(page, &PRODUCT_LABEL)
    }

    /// Test date (`date-time` label).
    ///
    /// `Ok(None)` when the page has no date-time label. A label whose value is
    /// not a recognizable date-time is a hard failure.
    pub fn test_date(&self, page: u32) -> Result<Option<NaiveDateTime>> {
        match self.field_by_pattern(page, &DATE_TIME_LABEL) {
            Some(raw) => rules::parse_test_date(page, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Address following the `E/S` marker in the paragraphs.
    pub fn extract_address(&self) -> Option<String> {
        rules::extract_address(&self.result.paragraphs)
    }

    /// First table that starts on `page`.
    ///
    /// Further tables on the same page are not reachable by page.
    pub fn find_table(&self, page: u32) -> Option<&'a TableElement> {
        self.result
            .tables
            .iter()
            .find(|table| table.page_number() == Some(page))
    }

    /// Reconstruct the table on `page` and enrich every row with the page's
    /// client, product, and test date.
    ///
    /// `Ok(None)` when the page has no table.
    pub fn extract_table(&self, page: u32) -> Result<Option<DataTable>> {
        let Some(element) = self.find_table(page) else {
            debug!("page {}: no table", page);
            return Ok(None);
        };

        let test_date = self
            .test_date(page)?
            .map(|date| date.format(&self.date_format).to_string())
            .unwrap_or_default();

        let mut table = reconstruct(element);
        table.assign(&self.columns.client, self.client_name(page).unwrap_or_default());
        table.assign(&self.columns.product, self.product_name(page).unwrap_or_default());
        table.assign(&self.columns.test_date, test_date);

        let malformed = table.malformed_rows();
        if !malformed.is_empty() {
            warn!("page {}: {} rows do not match the header width", page, malformed.len());
        }

        Ok(Some(table))
    }

    /// Every table in input order, each tagged with its page number,
    /// concatenated into one table.
    pub fn extract_tables(&self) -> Result<DataTable> {
        let mut combined = DataTable::empty();

        for (index, element) in self.result.tables.iter().enumerate() {
            let Some(page) = element.page_number() else {
                warn!("table {} has no bounding region; skipped", index);
                continue;
            };

            if !std::ptr::eq(self.find_table(page).unwrap_or(element), element) {
                warn!("table {} shares page {} with an earlier table; the earlier one is used", index, page);
            }

            if let Some(mut table) = self.extract_table(page)? {
                table.assign(&self.columns.page, page.to_string());
                combined.concat(table);
            }
        }

        debug!(
            "extracted {} rows from {} tables",
            combined.len(),
            self.result.tables.len()
        );

        Ok(combined)
    }

    /// Client, product, and test date for `page`.
    pub fn page_fields(&self, page: u32) -> Result<PageFields> {
        Ok(PageFields {
            page,
            client: self.client_name(page).map(str::to_string),
            product: self.product_name(page).map(str::to_string),
            test_date: self.test_date(page)?,
        })
    }

    /// Fields for every page that carries a key-value pair or a table.
    pub fn all_page_fields(&self) -> Result<Vec<PageFields>> {
        self.result
            .page_numbers()
            .into_iter()
            .map(|page| self.page_fields(page))
            .collect()
    }
}
