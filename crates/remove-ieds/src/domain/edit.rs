//! Edit intents exchanged between the dialog and the host.

use serde::Serialize;

use crate::domain::document::NodePath;

/// A single document mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    /// Remove the element at `path` together with its subtree.
    Remove {
        #[serde(serialize_with = "display")]
        path: NodePath,
        element: String,
    },
    /// Set (`Some`) or delete (`None`) one attribute of the element at `path`.
    Update {
        #[serde(serialize_with = "display")]
        path: NodePath,
        element: String,
        attribute: String,
        value: Option<String>,
    },
}

impl Edit {
    pub fn remove(path: NodePath, element: impl Into<String>) -> Self {
        Self::Remove {
            path,
            element: element.into(),
        }
    }

    pub fn update(
        path: NodePath,
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::Update {
            path,
            element: element.into(),
            attribute: attribute.into(),
            value,
        }
    }

    pub fn path(&self) -> &NodePath {
        match self {
            Self::Remove { path, .. } | Self::Update { path, .. } => path,
        }
    }

    /// Local name of the element the edit expects at its path.
    pub fn element(&self) -> &str {
        match self {
            Self::Remove { element, .. } | Self::Update { element, .. } => element,
        }
    }
}

/// One edit-intent notification: a compound mutation the host applies atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditEvent {
    pub title: String,
    pub edits: Vec<Edit>,
}

impl EditEvent {
    pub fn new(title: impl Into<String>, edits: Vec<Edit>) -> Self {
        Self {
            title: title.into(),
            edits,
        }
    }

    /// Number of elements this event removes.
    pub fn removal_count(&self) -> usize {
        self.edits
            .iter()
            .filter(|edit| matches!(edit, Edit::Remove { .. }))
            .count()
    }
}

fn display<S: serde::Serializer>(path: &NodePath, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(path)
}
