//! Source scanning service
//!
//! Discovers custom leaf kinds in C++ sources: every `class` or `struct`
//! whose body declares a `Tick(...)` function becomes a leaf kind.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::KindRecord;
use crate::infrastructure::traits::FileSystem;

/// Description given to every discovered kind.
pub const TICK_DESCRIPTION: &str = "Custom leaf node with Tick function";

/// Names are ASCII identifiers; a class whose name runs into non-ASCII letters is skipped.
const TICK_PATTERN: &str = r"(?:class|struct)\s+([A-Za-z_][A-Za-z0-9_]*)\b[^{]*\{[^}]*Tick\s*\([^)]*\)[^}]*\}";

/// Result of scanning a file or directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Files whose content was matched
    pub files: Vec<PathBuf>,
    /// Discovered kinds, first occurrence of each name, in discovery order
    pub kinds: Vec<KindRecord>,
}

/// Service for discovering leaf kinds in source files.
pub struct ScanService {
    fs: Arc<dyn FileSystem>,
    extensions: Vec<String>,
    pattern: Regex,
}

impl ScanService {
    /// Create a scanner for files with the given extensions (without dot).
    pub fn new(fs: Arc<dyn FileSystem>, extensions: Vec<String>) -> ApplicationResult<Self> {
        let pattern = Regex::new(TICK_PATTERN).map_err(|e| ApplicationError::OperationFailed {
            context: "compile regex".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self {
            fs,
            extensions,
            pattern,
        })
    }

    /// Extract kind records from source text. Repeated names are reported once.
    pub fn scan_text(&self, content: &str) -> Vec<KindRecord> {
        let mut seen = HashSet::new();
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|name| seen.insert(name.to_string()))
            .map(|name| KindRecord::leaf(name, TICK_DESCRIPTION))
            .collect()
    }

    /// Scan a single file, or every matching file below a directory.
    ///
    /// A file given explicitly is scanned regardless of its extension.
    #[instrument(level = "debug", skip(self))]
    pub fn scan_path(&self, path: &Path) -> ApplicationResult<ScanReport> {
        let files = if self.fs.is_dir(path) {
            self.collect_sources(path)
        } else if self.fs.is_file(path) {
            vec![path.to_path_buf()]
        } else {
            return Err(std::io::Error::from(std::io::ErrorKind::NotFound))
                .with_path_context("scan", path);
        };

        let mut report = ScanReport::default();
        let mut seen = HashSet::new();
        for file in files {
            let content = self
                .fs
                .read_to_string(&file)
                .with_path_context("read source", &file)?;
            let found = self.scan_text(&content);
            debug!("scan_path: {} kinds in {}", found.len(), file.display());
            report.files.push(file);
            report
                .kinds
                .extend(found.into_iter().filter(|k| seen.insert(k.name.clone())));
        }
        Ok(report)
    }

    fn collect_sources(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.has_source_extension(path))
            .collect();
        files.sort();
        files
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}
