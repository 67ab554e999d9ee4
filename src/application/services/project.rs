//! Project persistence service
//!
//! Creates, opens and saves tree documents, and feeds kind files into an
//! editing session.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, Document, Editor, IoResultExt};
use crate::config::Settings;
use crate::domain::KindRecord;
use crate::infrastructure::traits::FileSystem;

/// A standalone file of kind records.
///
/// ```toml
/// [[kinds]]
/// name = "MoveTo"
/// description = "Drive to the goal pose"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindFile {
    #[serde(default)]
    pub kinds: Vec<KindRecord>,
}

/// Service for document lifecycle operations.
pub struct ProjectService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl ProjectService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Create an empty document at `path`.
    ///
    /// Fails with `DocumentExists` unless `force` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn create(&self, path: &Path, force: bool) -> ApplicationResult<Editor> {
        if self.fs.exists(path) && !force {
            return Err(ApplicationError::DocumentExists(path.to_path_buf()));
        }
        let mut editor = Editor::new(self.settings.layout);
        self.load_configured_kinds(&mut editor, path)?;
        self.save(path, &editor)?;
        Ok(editor)
    }

    /// Open the document at `path` and register configured kind files.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, path: &Path) -> ApplicationResult<Editor> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read document", path)?;
        let document = Document::from_toml(&content)?;
        let mut editor = document.restore(self.settings.layout)?;
        self.load_configured_kinds(&mut editor, path)?;
        debug!(
            "open: {} nodes, {} kinds",
            editor.forest().iter().count(),
            editor.catalog().list_kinds().len()
        );
        Ok(editor)
    }

    /// Write the session to `path`, creating parent directories.
    #[instrument(level = "debug", skip(self, editor))]
    pub fn save(&self, path: &Path, editor: &Editor) -> ApplicationResult<()> {
        let content = Document::capture(editor).to_toml()?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent for", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write document", path)
    }

    /// Read kind records from a `[[kinds]]` TOML file.
    pub fn read_kind_file(&self, path: &Path) -> ApplicationResult<Vec<KindRecord>> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read kind file", path)?;
        let file: KindFile =
            toml::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
                context: format!("parse kind file: {}", path.display()),
                source: Box::new(e),
            })?;
        Ok(file.kinds)
    }

    /// Register the kinds of a kind file; returns how many were new.
    pub fn import_kinds(&self, editor: &mut Editor, path: &Path) -> ApplicationResult<usize> {
        let records = self.read_kind_file(path)?;
        Ok(editor.register_kinds(records)?)
    }

    fn load_configured_kinds(&self, editor: &mut Editor, document: &Path) -> ApplicationResult<()> {
        let base = document.parent().unwrap_or(Path::new("."));
        for file in self.settings.kind_files_relative_to(base) {
            let added = self.import_kinds(editor, &file)?;
            debug!("kind file {}: {} new kinds", file.display(), added);
        }
        Ok(())
    }
}
