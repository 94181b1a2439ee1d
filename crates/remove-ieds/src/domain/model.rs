//! Domain models for the IED list and removal results.

use serde::Serialize;

/// Link from a list item back to the IED it was projected from.
///
/// The document belongs to the host and changes between edits, so the handle does not borrow the
/// element. It records the IED's name together with its occurrence among the IEDs carrying that
/// name in document order, which tells duplicates and unnamed IEDs apart. A missing `name`
/// attribute is recorded as the empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IedHandle {
    name: String,
    occurrence: usize,
}

impl IedHandle {
    /// Handle of the first IED called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::nth(name, 0)
    }

    /// Handle of the IED called `name` preceded by `occurrence` others of the same name.
    pub fn nth(name: impl Into<String>, occurrence: usize) -> Self {
        Self {
            name: name.into(),
            occurrence,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn occurrence(&self) -> usize {
        self.occurrence
    }

    /// Name for reports and titles.
    pub fn label(&self) -> String {
        match (self.name.is_empty(), self.occurrence) {
            (true, n) => format!("<unnamed #{}>", n + 1),
            (false, 0) => self.name.clone(),
            (false, n) => format!("{} #{}", self.name, n + 1),
        }
    }
}

/// One selectable row of the removal dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub headline: String,
    pub supporting_text: String,
    pub ied: IedHandle,
    pub selected: bool,
}

/// Outcome of one removal run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// IEDs whose removal event was applied by the host, in dispatch order.
    pub removed: Vec<String>,
    /// IEDs for which no edit could be produced or applied.
    pub skipped: Vec<String>,
}

impl RemovalReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.skipped.is_empty()
    }
}
