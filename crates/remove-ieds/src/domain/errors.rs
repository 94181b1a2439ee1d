//! Domain-specific errors.

use thiserror::Error;

use crate::domain::document::NodePath;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("failed to parse SCL document: {0}")]
    Parse(String),
    #[error("root element is <{0}>, expected <SCL>")]
    NotScl(String),
    #[error("failed to serialize SCL document: {0}")]
    Serialize(String),
    #[error("no element at {0}")]
    StalePath(NodePath),
    #[error("expected <{expected}> at {path}, found <{found}>")]
    ElementMismatch {
        path: NodePath,
        expected: String,
        found: String,
    },
    #[error("the root element cannot be removed")]
    RootRemoval,
    #[error("no document loaded")]
    MissingDocument,
}
