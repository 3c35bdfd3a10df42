//! Filesystem-backed collaborators.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{DocumentAnalyzer, DocumentSource, ResultStore};
use crate::error::{AnalysisError, StoreError};

/// Checkpoint file name inside the log directory.
pub const CHECKPOINT_FILE: &str = "checkpoint.txt";

/// Regular files of one directory, filtered by extension, sorted by name.
pub struct DirectorySource {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    /// All regular files in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: Vec::new(),
        }
    }

    /// Only files with one of `extensions` (case-insensitive, without the dot).
    pub fn with_extensions<I, T>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }
}

impl DocumentSource for DirectorySource {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() || !self.accepts(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        debug!("Found {} documents in {}", names.len(), self.dir.display());
        Ok(names)
    }

    fn open(&self, name: &str) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(self.dir.join(name))?))
    }
}

/// Reads an analysis result that was already produced and saved as JSON.
///
/// Accepts a bare result object, or the service's polling envelope
/// (`{"status": ..., "analyzeResult": {...}}`), where a `failed` status is
/// reported as a service error.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResultAnalyzer;

impl DocumentAnalyzer for JsonResultAnalyzer {
    fn analyze(&self, document: &mut dyn Read) -> Result<serde_json::Value, AnalysisError> {
        let mut body = String::new();
        document.read_to_string(&mut body)?;
        let mut value: serde_json::Value = serde_json::from_str(&body)?;

        if let Some(status) = value.get("status").and_then(|s| s.as_str()) {
            if status.eq_ignore_ascii_case("failed") {
                let message = value
                    .pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("analysis failed");
                return Err(AnalysisError::Service(message.to_string()));
            }
            if !status.eq_ignore_ascii_case("succeeded") {
                return Err(AnalysisError::Service(format!("analysis not finished (status: {})", status)));
            }
        }

        if let Some(inner) = value.get_mut("analyzeResult") {
            return Ok(inner.take());
        }

        Ok(value)
    }
}

/// Stores raw results as `<results_dir>/<stem>.json` and the checkpoint as
/// `<log_dir>/checkpoint.txt`.
pub struct FileStore {
    results_dir: PathBuf,
    log_dir: PathBuf,
}

impl FileStore {
    pub fn new(results_dir: impl Into<PathBuf>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            log_dir: log_dir.into(),
        }
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.log_dir.join(CHECKPOINT_FILE)
    }

    pub fn result_path(&self, stem: &str) -> PathBuf {
        self.results_dir.join(format!("{}.json", stem))
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), StoreError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    };

    write().map_err(|source| StoreError::Write {
        path: path.display().to_string(),
        source,
    })
}

impl ResultStore for FileStore {
    fn store_result(&self, stem: &str, result: &serde_json::Value) -> Result<(), StoreError> {
        let path = self.result_path(stem);
        write_file(&path, &serde_json::to_string(result)?)?;
        debug!("Wrote raw result to {}", path.display());
        Ok(())
    }

    fn store_checkpoint(&self, processed: &[String]) -> Result<(), StoreError> {
        write_file(&self.checkpoint_path(), &serde_json::to_string(processed)?)
    }

    fn load_checkpoint(&self) -> Result<Vec<String>, StoreError> {
        let path = self.checkpoint_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Checkpoint {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| StoreError::Checkpoint {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
