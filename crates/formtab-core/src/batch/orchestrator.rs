//! Sequential batch orchestration.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{FormtabError, Result};
use crate::extract::DataExtractor;
use crate::models::analysis::AnalysisResult;
use crate::models::config::{BatchConfig, ExtractionConfig};
use crate::models::table::DataTable;

use super::{
    BatchEvent, BatchReport, DocumentAnalyzer, DocumentError, DocumentSource, ResultStore, Stage,
};

/// Runs every document of a source through analysis and extraction, one at a time.
///
/// A failing document is recorded in the report and never aborts the batch.
pub struct BatchOrchestrator<A, S> {
    analyzer: A,
    store: S,
    extraction: ExtractionConfig,
    source_suffix: String,
    skip: HashSet<String>,
}

impl<A: DocumentAnalyzer, S: ResultStore> BatchOrchestrator<A, S> {
    /// Create an orchestrator with default extraction settings.
    pub fn new(analyzer: A, store: S) -> Self {
        Self {
            analyzer,
            store,
            extraction: ExtractionConfig::default(),
            source_suffix: BatchConfig::default().source_suffix,
            skip: HashSet::new(),
        }
    }

    /// Set column names and date format used for extraction.
    pub fn with_extraction_config(mut self, config: ExtractionConfig) -> Self {
        self.extraction = config;
        self
    }

    /// Set the suffix appended to a file stem to form its source identifier.
    pub fn with_source_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.source_suffix = suffix.into();
        self
    }

    /// Skip documents whose source identifier is in `processed`.
    pub fn with_skip(mut self, processed: impl IntoIterator<Item = String>) -> Self {
        self.skip.extend(processed);
        self
    }

    /// Resume from the store's checkpoint.
    pub fn resume(self) -> Result<Self> {
        let processed = self.store.load_checkpoint()?;
        info!("Resuming: {} documents already processed", processed.len());
        Ok(self.with_skip(processed))
    }

    /// Process every document of `source`.
    ///
    /// Fails only if the source cannot be listed.
    pub fn run<D: DocumentSource + ?Sized>(&self, source: &D) -> Result<BatchReport> {
        self.run_with_progress(source, |_| {})
    }

    /// Like [`BatchOrchestrator::run`], reporting progress to `on_event`.
    pub fn run_with_progress<D, F>(&self, source: &D, mut on_event: F) -> Result<BatchReport>
    where
        D: DocumentSource + ?Sized,
        F: FnMut(BatchEvent<'_>),
    {
        let names = source.list()?;
        on_event(BatchEvent::Listed { total: names.len() });
        info!("Processing {} documents", names.len());

        let mut report = BatchReport::default();
        // Checkpoint keeps entries from earlier runs so a second crash loses nothing.
        let mut checkpoint: Vec<String> = {
            let mut previous: Vec<String> = self.skip.iter().cloned().collect();
            previous.sort();
            previous
        };

        for (index, name) in names.iter().enumerate() {
            let source_id = self.source_id(name);

            if self.skip.contains(&source_id) {
                debug!("Skipping {} (already processed)", name);
                report.skipped.push(source_id);
                on_event(BatchEvent::Skipped { name });
                continue;
            }

            on_event(BatchEvent::Started { name, index });
            info!("Analyzing {}", name);

            let outcome = self.process_document(source, name, &source_id, &mut report, &mut checkpoint);

            match outcome {
                Ok(table) => {
                    let rows = table.len();
                    debug!("{}: {} rows", name, rows);
                    report.dataset.concat(table);
                    on_event(BatchEvent::Finished { name, rows: Some(rows) });
                }
                Err((stage, error)) => {
                    warn!("Failed to process {} during {:?}: {}", name, stage, error);
                    report
                        .errors
                        .push(DocumentError::new(name.as_str(), source_id, stage, &error));
                    on_event(BatchEvent::Finished { name, rows: None });
                }
            }
        }

        info!(
            "Batch finished: {} processed, {} failed, {} skipped, {} rows",
            report.processed.len(),
            report.errors.len(),
            report.skipped.len(),
            report.dataset.len()
        );

        Ok(report)
    }

    fn process_document<D: DocumentSource + ?Sized>(
        &self,
        source: &D,
        name: &str,
        source_id: &str,
        report: &mut BatchReport,
        checkpoint: &mut Vec<String>,
    ) -> std::result::Result<DataTable, (Stage, FormtabError)> {
        let mut reader = source.open(name).map_err(|e| (Stage::Open, FormtabError::from(e)))?;

        let raw = self
            .analyzer
            .analyze(&mut reader)
            .map_err(|e| (Stage::Analysis, FormtabError::from(e)))?;

        self.store
            .store_result(&file_stem(name), &raw)
            .map_err(|e| (Stage::Persist, FormtabError::from(e)))?;

        report.processed.push(source_id.to_string());
        checkpoint.push(source_id.to_string());
        self.store
            .store_checkpoint(checkpoint)
            .map_err(|e| (Stage::Persist, FormtabError::from(e)))?;

        let result = AnalysisResult::from_value(raw).map_err(|e| (Stage::Schema, FormtabError::from(e)))?;

        let mut table = DataExtractor::new(&result)
            .with_config(&self.extraction)
            .extract_tables()
            .map_err(|e| (Stage::Extraction, FormtabError::from(e)))?;

        table.assign(&self.extraction.columns.source_file, source_id);
        Ok(table)
    }

    fn source_id(&self, name: &str) -> String {
        format!("{}{}", file_stem(name), self.source_suffix)
    }
}

fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, StoreError};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::io::{Cursor, Read};

    struct MemorySource(BTreeMap<String, String>);

    impl DocumentSource for MemorySource {
        fn list(&self) -> std::io::Result<Vec<String>> {
            Ok(self.0.keys().cloned().collect())
        }

        fn open(&self, name: &str) -> std::io::Result<Box<dyn Read>> {
            let body = self.0.get(name).cloned().unwrap_or_default();
            Ok(Box::new(Cursor::new(body.into_bytes())))
        }
    }

    /// Treats the body as JSON; a body of `FAIL` is a service error.
    struct EchoAnalyzer;

    impl DocumentAnalyzer for EchoAnalyzer {
        fn analyze(&self, document: &mut dyn Read) -> std::result::Result<serde_json::Value, AnalysisError> {
            let mut body = String::new();
            document.read_to_string(&mut body)?;
            if body == "FAIL" {
                return Err(AnalysisError::Service("quota exceeded".to_string()));
            }
            Ok(serde_json::from_str(&body)?)
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        results: RefCell<Vec<String>>,
        checkpoint: RefCell<Vec<String>>,
    }

    impl ResultStore for &MemoryStore {
        fn store_result(&self, stem: &str, _result: &serde_json::Value) -> std::result::Result<(), StoreError> {
            self.results.borrow_mut().push(stem.to_string());
            Ok(())
        }

        fn store_checkpoint(&self, processed: &[String]) -> std::result::Result<(), StoreError> {
            *self.checkpoint.borrow_mut() = processed.to_vec();
            Ok(())
        }

        fn load_checkpoint(&self) -> std::result::Result<Vec<String>, StoreError> {
            Ok(self.checkpoint.borrow().clone())
        }
    }

    fn document(client: &str, rows: &[&str]) -> String {
        let mut cells = vec![serde_json::json!({"kind": "columnHeader", "columnIndex": 0, "content": "Ensayo"})];
        for row in rows {
            cells.push(serde_json::json!({"kind": "content", "columnIndex": 0, "content": row}));
        }
        serde_json::json!({
            "keyValuePairs": [{
                "key": {"content": "Cliente/Client", "boundingRegions": [{"pageNumber": 1}]},
                "value": {"content": client}
            }],
            "tables": [{"boundingRegions": [{"pageNumber": 1}], "cells": cells}]
        })
        .to_string()
    }

    fn source(docs: &[(&str, String)]) -> MemorySource {
        MemorySource(docs.iter().map(|(n, b)| (n.to_string(), b.clone())).collect())
    }

    #[test]
    fn test_failed_document_does_not_abort_batch() {
        let store = MemoryStore::default();
        let orchestrator = BatchOrchestrator::new(EchoAnalyzer, &store);
        let source = source(&[
            ("a.json", document("Acme", &["x", "y"])),
            ("b.json", "FAIL".to_string()),
            ("c.json", document("Beta", &["z"])),
        ]);

        let report = orchestrator.run(&source).unwrap();

        assert_eq!(report.dataset.len(), 3);
        assert_eq!(
            report.dataset.column_values("ARCHIVO"),
            vec![Some("a.pdf"), Some("a.pdf"), Some("c.pdf")]
        );
        assert_eq!(report.processed, vec!["a.pdf", "c.pdf"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].file, "b.json");
        assert_eq!(report.errors[0].stage, Stage::Analysis);
        assert!(report.errors[0].error.contains("quota exceeded"));
        assert_eq!(*store.results.borrow(), vec!["a", "c"]);
        assert_eq!(*store.checkpoint.borrow(), vec!["a.pdf", "c.pdf"]);
    }

    #[test]
    fn test_extraction_failure_contributes_no_rows() {
        let bad_date = serde_json::json!({
            "keyValuePairs": [{
                "key": {"content": "Date-Time", "boundingRegions": [{"pageNumber": 1}]},
                "value": {"content": "unknown"}
            }],
            "tables": [{"boundingRegions": [{"pageNumber": 1}], "cells": [
                {"kind": "columnHeader", "columnIndex": 0, "content": "Ensayo"},
                {"kind": "content", "columnIndex": 0, "content": "x"}
            ]}]
        })
        .to_string();

        let store = MemoryStore::default();
        let orchestrator = BatchOrchestrator::new(EchoAnalyzer, &store);
        let report = orchestrator
            .run(&source(&[("a.json", bad_date), ("b.json", document("Beta", &["z"]))]))
            .unwrap();

        assert_eq!(report.dataset.len(), 1);
        assert_eq!(report.errors[0].stage, Stage::Extraction);
        assert_eq!(report.errors[0].source_id, "a.pdf");
        assert_eq!(report.processed, vec!["a.pdf", "b.pdf"]);
        assert_eq!(report.succeeded(), 1);
    }

    #[test]
    fn test_schema_failure_is_recorded() {
        let store = MemoryStore::default();
        let orchestrator = BatchOrchestrator::new(EchoAnalyzer, &store);
        let report = orchestrator
            .run(&source(&[("a.json", r#"{"tables": "nope"}"#.to_string())]))
            .unwrap();

        assert!(report.dataset.is_empty());
        assert_eq!(report.errors[0].stage, Stage::Schema);
    }

    #[test]
    fn test_resume_skips_checkpointed_documents() {
        let store = MemoryStore::default();
        store.checkpoint.borrow_mut().push("a.pdf".to_string());

        let orchestrator = BatchOrchestrator::new(EchoAnalyzer, &store)
            .with_source_suffix(".PDF")
            .resume()
            .unwrap();
        let report = orchestrator
            .run(&source(&[("a.json", document("Acme", &["x"])), ("b.json", document("Beta", &["y"]))]))
            .unwrap();

        // Suffix differs, so nothing matches the old checkpoint entry.
        assert!(report.skipped.is_empty());

        let orchestrator = BatchOrchestrator::new(EchoAnalyzer, &store).with_skip(vec!["a.PDF".to_string()]);
        let mut events = Vec::new();
        let report = orchestrator
            .with_source_suffix(".PDF")
            .run_with_progress(
                &source(&[("a.json", document("Acme", &["x"])), ("b.json", document("Beta", &["y"]))]),
                |event| events.push(format!("{:?}", event)),
            )
            .unwrap();

        assert_eq!(report.skipped, vec!["a.PDF"]);
        assert_eq!(report.processed, vec!["b.PDF"]);
        assert_eq!(report.dataset.column_values("CLIENTE"), vec![Some("Beta")]);
        assert_eq!(events.len(), 4);
        assert_eq!(*store.checkpoint.borrow(), vec!["a.PDF", "b.PDF"]);
    }
}
