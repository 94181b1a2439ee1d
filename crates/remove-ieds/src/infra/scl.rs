//! Reading and writing SCL files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::domain::document::SclDocument;
use crate::infra::config::Config;

/// How a document is written back to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Copy an existing target aside before overwriting it.
    pub backup: bool,
    pub indent: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            backup: false,
            indent: "  ".into(),
        }
    }
}

impl WriteOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backup: config.output.backup(),
            indent: config.output.indent(),
        }
    }
}

/// Parse the SCL file at `path`.
pub fn read_document(path: &Path) -> Result<SclDocument> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("failed to read SCL file {}", path.display()))?;
    let document = SclDocument::parse(&xml)
        .with_context(|| format!("invalid SCL file {}", path.display()))?;
    Ok(document)
}

/// Serialize `document` to `path`. Returns the backup location when one was made.
pub fn write_document(
    path: &Path,
    document: &SclDocument,
    options: &WriteOptions,
) -> Result<Option<PathBuf>> {
    let xml = document
        .to_xml_string(&options.indent)
        .context("failed to serialize SCL document")?;

    let backup = if options.backup && path.exists() {
        let backup = backup_path(path, OffsetDateTime::now_utc())?;
        fs::copy(path, &backup).with_context(|| {
            format!(
                "failed to back up {} to {}",
                path.display(),
                backup.display()
            )
        })?;
        tracing::debug!(backup = %backup.display(), "backup written");
        Some(backup)
    } else {
        None
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, xml).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(backup)
}

fn backup_path(path: &Path, now: OffsetDateTime) -> Result<PathBuf> {
    let stamp = now
        .format(format_description!(
            "[year][month][day]T[hour][minute][second]"
        ))
        .context("failed to format backup timestamp")?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "document.scd".into());
    Ok(path.with_file_name(format!("{file_name}.{stamp}.bak")))
}
