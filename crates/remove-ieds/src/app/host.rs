//! The document owner the dialog talks to.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::document::SclDocument;
use crate::domain::edit::EditEvent;
use crate::domain::errors::DomainError;
use crate::infra::scl::{self, WriteOptions};

/// Owner of the edited document.
///
/// The dialog reads the document and the change counter, and requests every mutation through
/// [`Host::dispatch`]. A host applies an event before `dispatch` returns and bumps the counter.
pub trait Host {
    /// The current document, if one is loaded.
    fn document(&self) -> Option<&SclDocument>;

    /// Monotonic counter advanced after every applied edit or reload.
    fn edit_count(&self) -> u64;

    /// Apply one edit-intent event.
    fn dispatch(&mut self, event: EditEvent) -> Result<(), DomainError>;
}

/// Host backing the terminal editor and the command line.
#[derive(Debug, Default)]
pub struct EditorHost {
    document: Option<SclDocument>,
    source: Option<PathBuf>,
    edit_count: u64,
    saved_at: u64,
    history: Vec<EditEvent>,
}

impl EditorHost {
    /// A host without a document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host editing an in-memory document.
    pub fn with_document(document: SclDocument) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    /// Load `path`, replacing the current document.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let document = scl::read_document(&path)?;
        tracing::info!(path = %path.display(), ieds = document.ieds().len(), "document loaded");
        self.replace_document(document);
        self.source = Some(path);
        Ok(())
    }

    /// Swap in a new document wholesale.
    pub fn replace_document(&mut self, document: SclDocument) {
        self.document = Some(document);
        self.history.clear();
        self.edit_count += 1;
        self.saved_at = self.edit_count;
    }

    /// Path the document was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Events applied since the document was loaded, oldest first.
    pub fn history(&self) -> &[EditEvent] {
        &self.history
    }

    /// Whether edits were applied since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.edit_count != self.saved_at
    }

    /// Write the document to `target`, or back to its source when `None`.
    pub fn save(&mut self, target: Option<&Path>, options: &WriteOptions) -> Result<PathBuf> {
        let document = self.document.as_ref().ok_or(DomainError::MissingDocument)?;
        let path = match (target, self.source.as_deref()) {
            (Some(target), _) => target.to_path_buf(),
            (None, Some(source)) => source.to_path_buf(),
            (None, None) => anyhow::bail!("no output path for an in-memory document"),
        };
        scl::write_document(&path, document, options)?;
        self.saved_at = self.edit_count;
        tracing::info!(path = %path.display(), edits = self.history.len(), "document saved");
        Ok(path)
    }
}

impl Host for EditorHost {
    fn document(&self) -> Option<&SclDocument> {
        self.document.as_ref()
    }

    fn edit_count(&self) -> u64 {
        self.edit_count
    }

    fn dispatch(&mut self, event: EditEvent) -> Result<(), DomainError> {
        let document = self.document.as_mut().ok_or(DomainError::MissingDocument)?;
        let applied = document.apply(&event)?;
        self.edit_count += 1;
        tracing::info!(title = %event.title, edits = applied, count = self.edit_count, "edit applied");
        self.history.push(event);
        Ok(())
    }
}
