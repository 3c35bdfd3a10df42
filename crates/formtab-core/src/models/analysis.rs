//! Wire model of a document analysis result.
//!
//! Accepts both the REST spelling (`keyValuePairs`, `boundingRegions`, ...)
//! and the SDK dictionary spelling (`key_value_pairs`, `bounding_regions`, ...)
//! of the same schema. Fields the extractor does not read are ignored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structured output of the document analysis service for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    /// Labeled fields detected anywhere in the document.
    #[serde(alias = "key_value_pairs")]
    pub key_value_pairs: Vec<KeyValuePair>,

    /// Tables as flat cell lists.
    pub tables: Vec<TableElement>,

    /// Free-text blocks.
    pub paragraphs: Vec<Paragraph>,
}

impl AnalysisResult {
    /// Parse a result from JSON text.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Convert a raw JSON value (as returned by the analysis boundary).
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Distinct pages that carry a key-value pair or a table, ascending.
    pub fn page_numbers(&self) -> Vec<u32> {
        let pages: BTreeSet<u32> = self
            .key_value_pairs
            .iter()
            .filter_map(|kv| kv.key.page_number())
            .chain(self.tables.iter().filter_map(TableElement::page_number))
            .collect();

        pages.into_iter().collect()
    }
}

/// Page and position metadata of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundingRegion {
    /// 1-based page number.
    #[serde(alias = "page_number")]
    pub page_number: u32,
}

/// Text element with its location (the key or value side of a pair).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentElement {
    pub content: String,

    #[serde(alias = "bounding_regions")]
    pub bounding_regions: Vec<BoundingRegion>,
}

impl DocumentElement {
    /// Page of the first bounding region, if any.
    pub fn page_number(&self) -> Option<u32> {
        self.bounding_regions.first().map(|r| r.page_number)
    }
}

/// One labeled field, e.g. `Cliente/Client: Acme Corp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValuePair {
    pub key: DocumentElement,

    /// The upstream service emits `null` for labels with no detected value.
    pub value: Option<DocumentElement>,
}

impl KeyValuePair {
    /// Value content, `""` when the value side is absent.
    pub fn value_content(&self) -> &str {
        self.value.as_ref().map_or("", |v| v.content.as_str())
    }
}

/// A table described as a flat stream of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableElement {
    #[serde(alias = "bounding_regions")]
    pub bounding_regions: Vec<BoundingRegion>,

    pub cells: Vec<Cell>,
}

impl TableElement {
    /// Page the table starts on.
    pub fn page_number(&self) -> Option<u32> {
        self.bounding_regions.first().map(|r| r.page_number)
    }
}

/// Role of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    ColumnHeader,
    Content,
    RowHeader,
    StubHead,
    Description,
    #[serde(other)]
    Unknown,
}

/// A single table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    /// Absent kinds take part in neither header nor row reconstruction.
    pub kind: Option<CellKind>,

    #[serde(alias = "column_index")]
    pub column_index: usize,

    #[serde(alias = "column_span")]
    pub column_span: Option<u32>,

    pub content: String,
}

impl Cell {
    pub fn is_header(&self) -> bool {
        self.kind == Some(CellKind::ColumnHeader)
    }

    pub fn is_content(&self) -> bool {
        self.kind == Some(CellKind::Content)
    }

    /// Whether this cell visually merges two or more columns.
    pub fn is_spanning(&self) -> bool {
        self.column_span.is_some_and(|span| span >= 2)
    }
}

/// A free-text block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let result = AnalysisResult::from_json_str("{}").unwrap();
        assert!(result.key_value_pairs.is_empty());
        assert!(result.tables.is_empty());
        assert!(result.paragraphs.is_empty());

        let result = AnalysisResult::from_json_str(r#"{"paragraphs": [{"content": "x"}]}"#).unwrap();
        assert!(result.tables.is_empty());
        assert_eq!(result.paragraphs.len(), 1);
    }

    #[test]
    fn test_accepts_both_spellings() {
        let camel = r#"{
            "keyValuePairs": [{
                "key": {"content": "Producto", "boundingRegions": [{"pageNumber": 2}]},
                "value": {"content": "Diesel"}
            }],
            "tables": [{
                "boundingRegions": [{"pageNumber": 2}],
                "cells": [{"kind": "columnHeader", "columnIndex": 1, "columnSpan": 2, "content": "A"}]
            }]
        }"#;
        let snake = r#"{
            "key_value_pairs": [{
                "key": {"content": "Producto", "bounding_regions": [{"page_number": 2}]},
                "value": {"content": "Diesel"}
            }],
            "tables": [{
                "bounding_regions": [{"page_number": 2}],
                "cells": [{"kind": "columnHeader", "column_index": 1, "column_span": 2, "content": "A"}]
            }]
        }"#;

        let a = AnalysisResult::from_json_str(camel).unwrap();
        let b = AnalysisResult::from_json_str(snake).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key_value_pairs[0].key.page_number(), Some(2));
        assert!(a.tables[0].cells[0].is_spanning());
        assert_eq!(a.tables[0].cells[0].column_index, 1);
    }

    #[test]
    fn test_null_value_and_unknown_kind() {
        let json = r#"{
            "key_value_pairs": [{"key": {"content": "Cliente/Client"}, "value": null}],
            "tables": [{"cells": [{"kind": "somethingNew", "column_index": 0, "content": "x"}, {"column_index": 1}]}]
        }"#;
        let result = AnalysisResult::from_json_str(json).unwrap();

        assert_eq!(result.key_value_pairs[0].value_content(), "");
        assert_eq!(result.key_value_pairs[0].key.page_number(), None);
        assert_eq!(result.tables[0].cells[0].kind, Some(CellKind::Unknown));
        assert_eq!(result.tables[0].cells[1].kind, None);
        assert!(!result.tables[0].cells[1].is_header());
        assert!(!result.tables[0].cells[1].is_content());
    }

    #[test]
    fn test_page_numbers() {
        let json = r#"{
            "keyValuePairs": [{"key": {"content": "a", "boundingRegions": [{"pageNumber": 3}]}}],
            "tables": [
                {"boundingRegions": [{"pageNumber": 1}]},
                {"boundingRegions": [{"pageNumber": 3}]}
            ]
        }"#;
        let result = AnalysisResult::from_json_str(json).unwrap();
        assert_eq!(result.page_numbers(), vec![1, 3]);
    }
}
